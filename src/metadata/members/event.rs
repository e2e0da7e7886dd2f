use std::sync::Arc;

use crate::{
    metadata::{
        customattributes::CustomAttributeList,
        lazy::Lazy,
        members::{EventAttributes, MethodRc, Owned, OwnerSlot, TokenCell},
        module::ModuleContext,
        typesystem::TypeReference,
    },
    Result,
};

/// A reference-counted pointer to an `EventDefinition`
pub type EventRc = Arc<EventDefinition>;

/// The accessor methods of an event, from its `MethodSemantics` rows
#[derive(Debug, Clone, Default)]
pub struct EventAccessors {
    /// `add_` method
    pub add: Option<MethodRc>,
    /// `remove_` method
    pub remove: Option<MethodRc>,
    /// `raise_` method
    pub invoke: Option<MethodRc>,
    /// Further accessors marked `Other`
    pub other: Vec<MethodRc>,
}

/// An event defined by a type.
///
/// Events read from an image look up their accessor methods on first access, under the lock
/// of the owning module. Events built in memory carry their accessors from the start.
pub struct EventDefinition {
    /// `Event` token, assigned when read or written
    pub token: TokenCell,
    owner: OwnerSlot,
    /// Event name
    pub name: String,
    /// `EventAttributes`
    pub attributes: EventAttributes,
    /// The delegate type of the event
    pub event_type: TypeReference,
    accessors: Lazy<EventAccessors>,
    /// Custom attributes applied to the event
    pub custom_attributes: CustomAttributeList,
}

impl EventDefinition {
    /// Creates an event with the given accessors
    #[must_use]
    pub fn new(
        name: &str,
        attributes: EventAttributes,
        event_type: TypeReference,
        accessors: EventAccessors,
    ) -> Self {
        Self::with_accessors(name, attributes, event_type, Lazy::resolved(accessors))
    }

    /// Creates an event whose accessors are looked up by `resolver` on first access
    pub fn from_semantics(
        context: Arc<ModuleContext>,
        name: &str,
        attributes: EventAttributes,
        event_type: TypeReference,
        resolver: impl Fn(&ModuleContext) -> Result<EventAccessors> + Send + Sync + 'static,
    ) -> Self {
        Self::with_accessors(
            name,
            attributes,
            event_type,
            Lazy::new(context, "event accessors", resolver),
        )
    }

    fn with_accessors(
        name: &str,
        attributes: EventAttributes,
        event_type: TypeReference,
        accessors: Lazy<EventAccessors>,
    ) -> Self {
        EventDefinition {
            token: TokenCell::default(),
            owner: OwnerSlot::default(),
            name: name.to_string(),
            attributes,
            event_type,
            accessors,
            custom_attributes: CustomAttributeList::new(),
        }
    }

    /// All accessors
    pub fn accessors(&self) -> Arc<EventAccessors> {
        self.accessors.get()
    }

    /// The `add_` method
    pub fn add_method(&self) -> Option<MethodRc> {
        self.accessors().add.clone()
    }

    /// The `remove_` method
    pub fn remove_method(&self) -> Option<MethodRc> {
        self.accessors().remove.clone()
    }

    /// The `raise_` method
    pub fn invoke_method(&self) -> Option<MethodRc> {
        self.accessors().invoke.clone()
    }

    /// Further accessors marked `Other`
    pub fn other_methods(&self) -> Vec<MethodRc> {
        self.accessors().other.clone()
    }

    /// Returns true once the accessors have been looked up
    pub fn is_resolved(&self) -> bool {
        self.accessors.is_resolved()
    }

    /// Description of the type holding this event
    pub fn owner(&self) -> Option<String> {
        self.owner.owner()
    }
}

impl Owned for EventDefinition {
    fn owner_slot(&self) -> &OwnerSlot {
        &self.owner
    }
}

impl std::fmt::Debug for EventDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDefinition")
            .field("token", &self.token.get())
            .field("name", &self.name)
            .field("event_type", &self.event_type.full_name())
            .field("accessors", &self.accessors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        metadata::{
            members::{MethodAttributes, MethodDefinition},
            signatures::MethodSignature,
            typesystem::PrimitiveType,
        },
        test::TestTypes,
        Error,
    };

    fn accessor(name: &str) -> MethodRc {
        Arc::new(MethodDefinition::new(
            name,
            MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME,
            MethodSignature::new(PrimitiveType::Void.into(), vec![]).instance(),
        ))
    }

    #[test]
    fn in_memory_accessors() {
        let add = accessor("add_Changed");
        let event = EventDefinition::new(
            "Changed",
            EventAttributes::empty(),
            TestTypes::new().attribute(),
            EventAccessors {
                add: Some(add.clone()),
                ..EventAccessors::default()
            },
        );

        assert!(event.is_resolved());
        assert!(Arc::ptr_eq(&event.add_method().unwrap(), &add));
        assert!(event.remove_method().is_none());
        assert!(event.other_methods().is_empty());
    }

    #[test]
    fn resolved_once_from_semantics() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let remove = accessor("remove_Changed");
        let event = EventDefinition::from_semantics(
            Arc::new(ModuleContext::detached()),
            "Changed",
            EventAttributes::empty(),
            TestTypes::new().attribute(),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(EventAccessors {
                    remove: Some(remove.clone()),
                    other: vec![accessor("other")],
                    ..EventAccessors::default()
                })
            },
        );

        assert!(!event.is_resolved());
        assert_eq!(event.remove_method().unwrap().name, "remove_Changed");
        assert_eq!(event.other_methods().len(), 1);
        assert!(event.add_method().is_none());
        assert!(event.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_lookup_is_contained() {
        let event = EventDefinition::from_semantics(
            Arc::new(ModuleContext::detached()),
            "Broken",
            EventAttributes::empty(),
            TestTypes::new().attribute(),
            |_| Err(Error::OutOfBounds),
        );

        assert!(event.add_method().is_none());
        assert!(event.other_methods().is_empty());
        assert!(!event.is_resolved());
    }
}
