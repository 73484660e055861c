//! The built-in object factory.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::{ConfigStore, Value, ValueMap, GLOBAL_SECTION, OBJECT_FACTORY_SECTION};

use super::descriptor::{load_descriptors, Descriptor};
use super::error::FactoryError;
use super::property::PropertyValue;
use super::registry::ClassRegistry;
use super::{Injectable, ObjectFactory, ObjectHandle};

const KEY_CLASS: &str = "class";
const KEY_CONFIG_SECTION: &str = "configSection";
const DEFAULT_SECTION: &str = "objects";

/// Builds the object factory described by the store's reserved
/// `objectFactory` section.
///
/// An optional `class` entry selects an alternate implementation registered
/// with [`ClassRegistry::register_factory`]; otherwise a [`DefaultFactory`]
/// is built. Scalar entries of the global section and of the `objectFactory`
/// section itself are injected as properties, placeholder-resolved.
pub fn build_factory(
    store: &Rc<ConfigStore>,
    registry: &Rc<ClassRegistry>,
) -> Result<Box<dyn ObjectFactory>, FactoryError> {
    let section = store.values(OBJECT_FACTORY_SECTION).clone();
    let mut factory: Box<dyn ObjectFactory> = match section.get(KEY_CLASS).and_then(Value::as_str)
    {
        Some(class) => {
            let ctor = registry
                .factory(class)
                .ok_or_else(|| FactoryError::ClassNotFound(class.to_string()))?;
            ctor(store.clone(), registry.clone())
        }
        None => Box::new(DefaultFactory::new(store.clone(), registry.clone())),
    };
    factory.set_configuration(store);

    let mut properties = store.values(GLOBAL_SECTION).clone();
    for (name, value) in &section {
        if name != KEY_CLASS {
            properties.insert(name.clone(), value.clone());
        }
    }
    for (name, value) in &properties {
        // Factory configuration is scalar-only; composites are skipped.
        match value {
            Value::String(s) => {
                factory.set_property(name, &PropertyValue::Str(store.resolve(s)));
            }
            Value::Bool(b) => factory.set_property(name, &PropertyValue::Bool(*b)),
            _ => {}
        }
    }
    Ok(factory)
}

/// The standard [`ObjectFactory`]: lazily indexed descriptors, a per-instance
/// singleton cache, and fail-fast cycle detection on `ref:` chains.
pub struct DefaultFactory {
    store: Rc<ConfigStore>,
    registry: Rc<ClassRegistry>,
    section: String,
    descriptors: Option<HashMap<String, Descriptor>>,
    singletons: HashMap<String, ObjectHandle>,
    in_progress: Vec<String>,
}

impl DefaultFactory {
    pub fn new(store: Rc<ConfigStore>, registry: Rc<ClassRegistry>) -> Self {
        Self {
            store,
            registry,
            section: DEFAULT_SECTION.to_string(),
            descriptors: None,
            singletons: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// The configuration section descriptors are read from.
    pub fn config_section(&self) -> &str {
        &self.section
    }

    /// Overrides the descriptor section. Only meaningful before the first
    /// construction, since descriptors are indexed once and kept.
    pub fn set_config_section(&mut self, section: impl Into<String>) {
        self.section = section.into();
    }

    fn descriptor(&mut self, id: &str) -> Option<Descriptor> {
        if self.descriptors.is_none() {
            let loaded = load_descriptors(self.store.values(&self.section));
            self.descriptors = Some(loaded);
        }
        self.descriptors
            .as_ref()
            .and_then(|descriptors| descriptors.get(id))
            .cloned()
    }

    fn construct(&mut self, id: &str, descriptor: &Descriptor) -> Result<ObjectHandle, FactoryError> {
        let object = self.instantiate(&descriptor.class, &descriptor.constructor_args)?;
        self.inject_globals(&object)?;
        for (name, value) in &descriptor.properties {
            let value = self.property_value(value)?;
            object.borrow_mut().set_property(name, &value);
        }
        // The cache entry must exist before the configuration callback runs
        // so a callback that turns around and asks for this id gets the same
        // instance.
        if descriptor.singleton {
            self.singletons.insert(id.to_string(), object.clone());
        }
        object.borrow_mut().set_configuration(&self.store);
        Ok(object)
    }

    fn instantiate(&mut self, class: &str, args: &ValueMap) -> Result<ObjectHandle, FactoryError> {
        let registry = self.registry.clone();
        let spec = registry
            .class(class)
            .ok_or_else(|| FactoryError::ClassNotFound(class.to_string()))?;

        let mut bound = Vec::with_capacity(spec.params().len());
        for (index, param) in spec.params().iter().enumerate() {
            // Binding preference: exact name, positional index, declared
            // default. Only supplied values pass through value construction.
            let value = if let Some(description) = args.get(param.name()) {
                self.property_value(description)?
            } else if let Some(description) = args.get(index.to_string().as_str()) {
                self.property_value(description)?
            } else if let Some(default) = param.default() {
                default.clone()
            } else {
                return Err(FactoryError::TooFewArguments {
                    class: class.to_string(),
                    parameter: param.name().to_string(),
                });
            };
            bound.push(value);
        }
        spec.construct(bound)
    }

    fn inject_globals(&mut self, object: &ObjectHandle) -> Result<(), FactoryError> {
        let globals = self.store.values(GLOBAL_SECTION).clone();
        for (name, value) in &globals {
            let value = self.property_value(value)?;
            object.borrow_mut().set_property(name, &value);
        }
        Ok(())
    }

    /// Recursive value construction: composites are rebuilt element-wise with
    /// placeholder-resolved keys; `"true"`/`"false"` become booleans; a
    /// `"ref:"` prefix recurses into [`create`](ObjectFactory::create); other
    /// scalars are placeholder-resolved.
    fn property_value(&mut self, description: &Value) -> Result<PropertyValue, FactoryError> {
        match description {
            Value::Map(entries) => {
                let mut out = IndexMap::new();
                for (key, value) in entries {
                    out.insert(self.store.resolve(key), self.property_value(value)?);
                }
                Ok(PropertyValue::Map(out))
            }
            Value::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.property_value(item)?);
                }
                Ok(PropertyValue::List(out))
            }
            Value::Bool(b) => Ok(PropertyValue::Bool(*b)),
            Value::String(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(PropertyValue::Bool(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(PropertyValue::Bool(false))
                } else if let (Some(prefix), Some(id)) = (s.get(..4), s.get(4..)) {
                    if prefix.eq_ignore_ascii_case("ref:") {
                        Ok(PropertyValue::Object(self.create(id)?))
                    } else {
                        Ok(PropertyValue::Str(self.store.resolve(s)))
                    }
                } else {
                    Ok(PropertyValue::Str(self.store.resolve(s)))
                }
            }
        }
    }
}

impl Injectable for DefaultFactory {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn set_property(&mut self, name: &str, value: &PropertyValue) {
        if name == KEY_CONFIG_SECTION {
            if let Some(section) = value.as_str() {
                self.set_config_section(section);
            }
        }
    }
}

impl ObjectFactory for DefaultFactory {
    fn create(&mut self, id: &str) -> Result<ObjectHandle, FactoryError> {
        let descriptor = self
            .descriptor(id)
            .ok_or_else(|| FactoryError::UndefinedObject(id.to_string()))?;

        if descriptor.singleton {
            if let Some(object) = self.singletons.get(id) {
                return Ok(object.clone());
            }
        }

        if self.in_progress.iter().any(|pending| pending == id) {
            let mut chain = self.in_progress.join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(id);
            return Err(FactoryError::CyclicReference { chain });
        }

        self.in_progress.push(id.to_string());
        let result = self.construct(id, &descriptor);
        self.in_progress.pop();
        result
    }

    fn create_by_class(
        &mut self,
        class: &str,
        args: &ValueMap,
        singleton: bool,
    ) -> Result<ObjectHandle, FactoryError> {
        // A pre-declared descriptor under the class name transparently
        // overrides ad-hoc construction; any failure of the probe is
        // swallowed.
        if let Ok(object) = self.create(class) {
            return Ok(object);
        }

        if singleton {
            if let Some(object) = self.singletons.get(class) {
                return Ok(object.clone());
            }
        }

        let object = self.instantiate(class, args)?;
        self.inject_globals(&object)?;
        object.borrow_mut().set_configuration(&self.store);
        if singleton {
            self.singletons.insert(class.to_string(), object.clone());
        }
        Ok(object)
    }

    fn new_instance(&mut self, class: &str, args: &ValueMap) -> Result<ObjectHandle, FactoryError> {
        self.instantiate(class, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{handle, ClassSpec};
    use std::path::PathBuf;

    #[derive(Default)]
    struct Service {
        host: String,
        verbose: bool,
        backend: Option<ObjectHandle>,
        tags: Vec<String>,
        configured: bool,
    }

    impl Injectable for Service {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }

        fn set_property(&mut self, name: &str, value: &PropertyValue) {
            match name {
                "host" => {
                    if let Some(host) = value.as_str() {
                        self.host = host.to_string();
                    }
                }
                "verbose" => {
                    if let Some(verbose) = value.as_bool() {
                        self.verbose = verbose;
                    }
                }
                "backend" => {
                    if let Some(backend) = value.as_object() {
                        self.backend = Some(backend.clone());
                    }
                }
                "tags" => {
                    if let Some(tags) = value.as_list() {
                        self.tags = tags
                            .iter()
                            .filter_map(|t| t.as_str().map(str::to_string))
                            .collect();
                    }
                }
                _ => {}
            }
        }

        fn set_configuration(&mut self, _store: &Rc<ConfigStore>) {
            self.configured = true;
        }
    }

    struct Endpoint {
        host: String,
        port: String,
    }

    impl Injectable for Endpoint {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[derive(Default)]
    struct Node {
        next: Option<ObjectHandle>,
    }

    impl Injectable for Node {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }

        fn set_property(&mut self, name: &str, value: &PropertyValue) {
            if name == "next" {
                if let Some(next) = value.as_object() {
                    self.next = Some(next.clone());
                }
            }
        }
    }

    fn registry() -> Rc<ClassRegistry> {
        let mut registry = ClassRegistry::new();
        registry.register("Service", ClassSpec::new(|_| Ok(handle(Service::default()))));
        registry.register("Node", ClassSpec::new(|_| Ok(handle(Node::default()))));
        registry.register(
            "Endpoint",
            ClassSpec::new(|args| {
                let host = args[0].as_str().unwrap_or_default().to_string();
                let port = args[1].as_str().unwrap_or_default().to_string();
                Ok(handle(Endpoint { host, port }))
            })
            .param("host")
            .param_default("port", PropertyValue::Str("80".into())),
        );
        Rc::new(registry)
    }

    fn store(text: &str) -> Rc<ConfigStore> {
        let table: toml::Table = toml::from_str(text).unwrap();
        let sections = table
            .into_iter()
            .map(|(key, value)| (key, Value::from_toml(value)))
            .collect();
        Rc::new(ConfigStore::new(
            PathBuf::from("/etc/app/config.xml"),
            sections,
            Vec::new(),
        ))
    }

    fn factory(text: &str) -> DefaultFactory {
        DefaultFactory::new(store(text), registry())
    }

    #[test]
    fn test_create_undefined_object() {
        let mut factory = factory("");
        let result = factory.create("nope");
        assert!(matches!(result, Err(FactoryError::UndefinedObject(_))));
    }

    #[test]
    fn test_create_unknown_class() {
        let mut factory = factory(
            r#"
            [objects.ghost]
            id = "ghost"
            class = "Ghost"
            "#,
        );
        let result = factory.create("ghost");
        assert!(matches!(result, Err(FactoryError::ClassNotFound(_))));
    }

    #[test]
    fn test_singleton_identity() {
        let mut factory = factory(
            r#"
            [objects.svc]
            id = "svc"
            class = "Service"
            "#,
        );
        let first = factory.create("svc").unwrap();
        let second = factory.create("svc").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_non_singleton_yields_distinct_instances() {
        let mut factory = factory(
            r#"
            [objects.svc]
            id = "svc"
            class = "Service"
            singleton = "false"
            "#,
        );
        let first = factory.create("svc").unwrap();
        let second = factory.create("svc").unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_property_and_global_injection() {
        let mut factory = factory(
            r#"
            [global]
            host = "global-host"
            [objects.svc]
            id = "svc"
            class = "Service"
            verbose = "true"
            "#,
        );
        let object = factory.create("svc").unwrap();
        let object = object.borrow();
        let service: &Service = object.downcast_ref().unwrap();
        assert_eq!(service.host, "global-host");
        assert!(service.verbose);
        assert!(service.configured);
    }

    #[test]
    fn test_descriptor_property_overrides_global() {
        let mut factory = factory(
            r#"
            [global]
            host = "global-host"
            [objects.svc]
            id = "svc"
            class = "Service"
            host = "local-host"
            "#,
        );
        let object = factory.create("svc").unwrap();
        let object = object.borrow();
        let service: &Service = object.downcast_ref().unwrap();
        assert_eq!(service.host, "local-host");
    }

    #[test]
    fn test_placeholder_resolution_in_properties() {
        let mut factory = factory(
            r#"
            [global]
            host = "localhost"
            [objects.svc]
            id = "svc"
            class = "Service"
            host = "${global.host}:8080"
            "#,
        );
        let object = factory.create("svc").unwrap();
        let object = object.borrow();
        let service: &Service = object.downcast_ref().unwrap();
        assert_eq!(service.host, "localhost:8080");
    }

    #[test]
    fn test_list_properties_construct_recursively() {
        let mut factory = factory(
            r#"
            [objects.svc]
            id = "svc"
            class = "Service"
            tags = ["a", "b"]
            "#,
        );
        let object = factory.create("svc").unwrap();
        let object = object.borrow();
        let service: &Service = object.downcast_ref().unwrap();
        assert_eq!(service.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_ref_property_builds_object_graph() {
        let mut factory = factory(
            r#"
            [objects.svc]
            id = "svc"
            class = "Service"
            backend = "ref:db"
            [objects.db]
            id = "db"
            class = "Node"
            "#,
        );
        let svc = factory.create("svc").unwrap();
        let db = factory.create("db").unwrap();
        let svc = svc.borrow();
        let service: &Service = svc.downcast_ref().unwrap();
        assert!(Rc::ptr_eq(service.backend.as_ref().unwrap(), &db));
    }

    #[test]
    fn test_reference_cycle_fails_fast() {
        let mut factory = factory(
            r#"
            [objects.a]
            id = "a"
            class = "Node"
            next = "ref:b"
            [objects.b]
            id = "b"
            class = "Node"
            next = "ref:a"
            "#,
        );
        let result = factory.create("a");
        assert!(matches!(
            result,
            Err(FactoryError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_constructor_binding_by_name_position_and_default() {
        let mut factory = factory(
            r#"
            [objects.named]
            id = "named"
            class = "Endpoint"
            singleton = "false"
            [objects.named.constructor-args]
            host = "named-host"
            port = "8443"

            [objects.positional]
            id = "positional"
            class = "Endpoint"
            singleton = "false"
            [objects.positional.constructor-args]
            0 = "positional-host"

            [objects.starved]
            id = "starved"
            class = "Endpoint"
            singleton = "false"
            "#,
        );

        let named = factory.create("named").unwrap();
        let named = named.borrow();
        let endpoint: &Endpoint = named.downcast_ref().unwrap();
        assert_eq!(endpoint.host, "named-host");
        assert_eq!(endpoint.port, "8443");

        let positional = factory.create("positional").unwrap();
        let positional = positional.borrow();
        let endpoint: &Endpoint = positional.downcast_ref().unwrap();
        assert_eq!(endpoint.host, "positional-host");
        assert_eq!(endpoint.port, "80");

        let result = factory.create("starved");
        assert!(matches!(
            result,
            Err(FactoryError::TooFewArguments { .. })
        ));
    }

    #[test]
    fn test_list_constructor_args_bind_positionally() {
        let mut factory = factory(
            r#"
            [objects.svc]
            id = "svc"
            class = "Endpoint"
            constructor-args = ["list-host", "8443"]
            "#,
        );
        let object = factory.create("svc").unwrap();
        let object = object.borrow();
        let endpoint: &Endpoint = object.downcast_ref().unwrap();
        assert_eq!(endpoint.host, "list-host");
        assert_eq!(endpoint.port, "8443");
    }

    #[test]
    fn test_end_to_end_constructor_placeholder() {
        let mut factory = factory(
            r#"
            [global]
            host = "localhost"
            [objects.svc]
            id = "svc"
            class = "Endpoint"
            [objects.svc.constructor-args]
            0 = "${global.host}"
            "#,
        );
        let first = factory.create("svc").unwrap();
        {
            let object = first.borrow();
            let endpoint: &Endpoint = object.downcast_ref().unwrap();
            assert_eq!(endpoint.host, "localhost");
        }
        let second = factory.create("svc").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_create_by_class_descriptor_override() {
        let mut factory = factory(
            r#"
            [objects.svc]
            id = "Service"
            class = "Service"
            host = "declared"
            "#,
        );
        let object = factory
            .create_by_class("Service", &ValueMap::new(), false)
            .unwrap();
        let object = object.borrow();
        let service: &Service = object.downcast_ref().unwrap();
        assert_eq!(service.host, "declared");
    }

    #[test]
    fn test_create_by_class_ad_hoc_singleton() {
        let mut factory = factory(
            r#"
            [global]
            host = "localhost"
            "#,
        );
        let first = factory
            .create_by_class("Service", &ValueMap::new(), true)
            .unwrap();
        let second = factory
            .create_by_class("Service", &ValueMap::new(), true)
            .unwrap();
        assert!(Rc::ptr_eq(&first, &second));

        {
            let object = first.borrow();
            let service: &Service = object.downcast_ref().unwrap();
            assert_eq!(service.host, "localhost");
            assert!(service.configured);
        }

        let distinct = factory
            .create_by_class("Service", &ValueMap::new(), false)
            .unwrap();
        assert!(!Rc::ptr_eq(&first, &distinct));
    }

    #[test]
    fn test_create_by_class_unknown_class() {
        let mut factory = factory("");
        let result = factory.create_by_class("Ghost", &ValueMap::new(), true);
        assert!(matches!(result, Err(FactoryError::ClassNotFound(_))));
    }

    #[test]
    fn test_new_instance_skips_descriptor_and_cache() {
        let mut factory = factory(
            r#"
            [global]
            host = "localhost"
            "#,
        );
        let first = factory.new_instance("Service", &ValueMap::new()).unwrap();
        let second = factory.new_instance("Service", &ValueMap::new()).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));

        // No property injection on direct instantiation.
        let object = first.borrow();
        let service: &Service = object.downcast_ref().unwrap();
        assert_eq!(service.host, "");
        assert!(!service.configured);
    }

    #[test]
    fn test_descriptors_indexed_once() {
        let mut factory = factory(
            r#"
            [objects.svc]
            id = "svc"
            class = "Service"
            [services.other]
            id = "other"
            class = "Service"
            "#,
        );
        factory.create("svc").unwrap();

        // Descriptor discovery runs once per factory instance; switching the
        // section afterwards is intentionally invisible.
        factory.set_config_section("services");
        assert!(factory.create("svc").is_ok());
        assert!(matches!(
            factory.create("other"),
            Err(FactoryError::UndefinedObject(_))
        ));
    }

    #[test]
    fn test_build_factory_default_with_section_override() {
        let store = store(
            r#"
            [objectFactory]
            configSection = "services"
            [services.svc]
            id = "svc"
            class = "Service"
            "#,
        );
        let registry = registry();
        let mut factory = build_factory(&store, &registry).unwrap();
        assert!(factory.create("svc").is_ok());
    }

    #[test]
    fn test_build_factory_unknown_class() {
        let store = store(
            r#"
            [objectFactory]
            class = "GhostFactory"
            "#,
        );
        let registry = registry();
        let result = build_factory(&store, &registry);
        assert!(matches!(result, Err(FactoryError::ClassNotFound(_))));
    }

    #[test]
    fn test_build_factory_registered_alternate() {
        let store = store(
            r#"
            [objectFactory]
            class = "CustomFactory"
            configSection = "services"
            [services.svc]
            id = "svc"
            class = "Service"
            "#,
        );
        let mut registry = ClassRegistry::new();
        registry.register("Service", ClassSpec::new(|_| Ok(handle(Service::default()))));
        registry.register_factory("CustomFactory", |store, registry| {
            Box::new(DefaultFactory::new(store, registry))
        });
        let registry = Rc::new(registry);

        let mut factory = build_factory(&store, &registry).unwrap();
        assert!(factory.create("svc").is_ok());
    }
}
