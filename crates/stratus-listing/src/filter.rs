use stratus_types::ResourceDescriptor;

/// Predicate applied to every descriptor before it reaches the consumer.
pub trait DescriptorFilter {
    fn accept(&self, descriptor: &ResourceDescriptor) -> bool;
}

impl<F> DescriptorFilter for F
where
    F: Fn(&ResourceDescriptor) -> bool,
{
    fn accept(&self, descriptor: &ResourceDescriptor) -> bool {
        self(descriptor)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl DescriptorFilter for AcceptAll {
    fn accept(&self, _: &ResourceDescriptor) -> bool {
        true
    }
}

/// Buckets and prefixes only.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContainersOnly;

impl DescriptorFilter for ContainersOnly {
    fn accept(&self, descriptor: &ResourceDescriptor) -> bool {
        descriptor.is_container
    }
}

/// Objects only.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectsOnly;

impl DescriptorFilter for ObjectsOnly {
    fn accept(&self, descriptor: &ResourceDescriptor) -> bool {
        !descriptor.is_container
    }
}
