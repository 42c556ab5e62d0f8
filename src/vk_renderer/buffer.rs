use std::sync::Arc;

use vulkano::buffer::{Buffer, BufferContents, BufferCreateInfo, BufferUsage, Subbuffer};
use vulkano::format::Format;
use vulkano::memory::allocator::{AllocationCreateInfo, MemoryTypeFilter};
use vulkano::shader::EntryPoint;

use super::error::RenderError;
use super::vk::MemAllocators;

/// One named input slot of a vertex shader, as reflected from its interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    pub name: String,
    pub location: u32,
    pub components: u32,
}

/// The set of attribute slots a shader program consumes, looked up by name.
pub struct AttributeSlots {
    slots: Vec<AttributeSlot>,
}

impl AttributeSlots {
    pub fn new(slots: Vec<AttributeSlot>) -> Self {
        Self { slots }
    }

    /// Reflect the named inputs of a vertex shader entry point. Inputs the
    /// compiler stripped of their name cannot be bound by name and are
    /// skipped.
    pub fn from_entry_point(entry_point: &EntryPoint) -> Self {
        let slots = entry_point
            .info()
            .input_interface
            .elements()
            .iter()
            .filter_map(|element| {
                element.name.as_ref().map(|name| AttributeSlot {
                    name: name.to_string(),
                    location: element.location,
                    components: element.ty.num_components,
                })
            })
            .collect();

        Self { slots }
    }

    /// Look up a slot by name and check that the caller's per-vertex
    /// component count matches what the shader declares.
    pub fn resolve(&self, name: &str, components: u32) -> Result<&AttributeSlot, RenderError> {
        let slot = self
            .slots
            .iter()
            .find(|slot| slot.name == name)
            .ok_or_else(|| RenderError::AttributeNotFound(name.to_string()))?;

        if slot.components != components {
            return Err(RenderError::InvalidParameter(format!(
                "attribute `{name}` expects {} components per vertex, got {components}",
                slot.components
            )));
        }

        Ok(slot)
    }
}

/// A flat float array uploaded to a device-local vertex buffer and resolved
/// against a named attribute slot. Data is tightly packed: `components`
/// consecutive floats per vertex, no interleaving, offset 0.
pub struct AttributeBinding {
    pub name: String,
    pub location: u32,
    pub components: u32,
    pub format: Format,
    pub content: Subbuffer<[f32]>,
}

impl AttributeBinding {
    pub fn vertex_count(&self) -> u32 {
        self.content.len() as u32 / self.components
    }
}

/// A 16-bit element buffer for one indexed draw.
pub struct IndexBinding {
    pub content: Subbuffer<[u16]>,
}

impl IndexBinding {
    pub fn count(&self) -> u32 {
        self.content.len() as u32
    }
}

pub(crate) fn component_format(components: u32) -> Result<Format, RenderError> {
    match components {
        1 => Ok(Format::R32_SFLOAT),
        2 => Ok(Format::R32G32_SFLOAT),
        3 => Ok(Format::R32G32B32_SFLOAT),
        4 => Ok(Format::R32G32B32A32_SFLOAT),
        _ => Err(RenderError::InvalidParameter(format!(
            "attribute component count must be 1..=4, got {components}"
        ))),
    }
}

pub(crate) fn check_attribute_data(data: &[f32], components: u32) -> Result<(), RenderError> {
    if data.is_empty() {
        return Err(RenderError::InvalidParameter(
            "attribute data must not be empty".into(),
        ));
    }
    if data.len() % components as usize != 0 {
        return Err(RenderError::InvalidParameter(format!(
            "attribute data length {} is not a multiple of {components}",
            data.len()
        )));
    }
    Ok(())
}

/// Upload a flat float array into a vertex buffer bound to the named
/// attribute slot.
///
/// Validation runs before any allocation, so a failed upload leaves no
/// partial binding behind.
pub fn upload_attribute(
    allocators: &Arc<MemAllocators>,
    slots: &AttributeSlots,
    name: &str,
    data: &[f32],
    components: u32,
) -> Result<AttributeBinding, RenderError> {
    let format = component_format(components)?;
    check_attribute_data(data, components)?;
    let slot = slots.resolve(name, components)?;

    let content = Buffer::from_iter(
        allocators.memory.clone(),
        BufferCreateInfo {
            usage: BufferUsage::VERTEX_BUFFER,
            ..Default::default()
        },
        AllocationCreateInfo {
            memory_type_filter: MemoryTypeFilter::PREFER_DEVICE
                | MemoryTypeFilter::HOST_SEQUENTIAL_WRITE,
            ..Default::default()
        },
        data.iter().copied(),
    )
    .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

    log::debug!(
        "uploaded attribute `{}` to location {}: {} vertices x {components} floats",
        slot.name,
        slot.location,
        data.len() / components as usize,
    );

    Ok(AttributeBinding {
        name: slot.name.clone(),
        location: slot.location,
        components,
        format,
        content,
    })
}

/// Upload a triangle index list into a 16-bit element buffer.
pub fn upload_indices(
    allocators: &Arc<MemAllocators>,
    indices: &[u16],
) -> Result<IndexBinding, RenderError> {
    if indices.is_empty() {
        return Err(RenderError::InvalidParameter(
            "index data must not be empty".into(),
        ));
    }

    let content = Buffer::from_iter(
        allocators.memory.clone(),
        BufferCreateInfo {
            usage: BufferUsage::INDEX_BUFFER,
            ..Default::default()
        },
        AllocationCreateInfo {
            memory_type_filter: MemoryTypeFilter::PREFER_DEVICE
                | MemoryTypeFilter::HOST_SEQUENTIAL_WRITE,
            ..Default::default()
        },
        indices.iter().copied(),
    )
    .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

    Ok(IndexBinding { content })
}

/// Host-visible buffer the color attachment is copied into for readback.
pub fn readback_buffer(
    allocators: &Arc<MemAllocators>,
    len: u32,
) -> Result<Subbuffer<[u8]>, RenderError> {
    Buffer::from_iter(
        allocators.memory.clone(),
        BufferCreateInfo {
            usage: BufferUsage::TRANSFER_DST,
            ..Default::default()
        },
        AllocationCreateInfo {
            memory_type_filter: MemoryTypeFilter::PREFER_HOST
                | MemoryTypeFilter::HOST_RANDOM_ACCESS,
            ..Default::default()
        },
        (0..len).map(|_| 0u8),
    )
    .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))
}

/// One-shot uniform buffer holding a single value.
#[derive(Clone)]
pub struct VkBuffer<T: BufferContents> {
    pub content: Subbuffer<T>,
}

impl<T: BufferContents> VkBuffer<T> {
    pub fn uniform(allocators: &Arc<MemAllocators>, data: T) -> Result<Self, RenderError> {
        let content = Buffer::from_data(
            allocators.memory.clone(),
            BufferCreateInfo {
                usage: BufferUsage::UNIFORM_BUFFER,
                ..Default::default()
            },
            AllocationCreateInfo {
                memory_type_filter: MemoryTypeFilter::PREFER_DEVICE
                    | MemoryTypeFilter::HOST_SEQUENTIAL_WRITE,
                ..Default::default()
            },
            data,
        )
        .map_err(|e| RenderError::ResourceAllocationFailure(e.to_string()))?;

        Ok(Self { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_slots() -> AttributeSlots {
        AttributeSlots::new(vec![
            AttributeSlot {
                name: "position".into(),
                location: 0,
                components: 3,
            },
            AttributeSlot {
                name: "normal".into(),
                location: 1,
                components: 3,
            },
        ])
    }

    #[test]
    fn resolve_finds_named_slots() {
        let slots = test_slots();
        let position = slots.resolve("position", 3).unwrap();
        assert_eq!(position.location, 0);
        let normal = slots.resolve("normal", 3).unwrap();
        assert_eq!(normal.location, 1);
    }

    #[test]
    fn unknown_attribute_is_reported_by_name() {
        let slots = test_slots();
        match slots.resolve("a_Color", 3) {
            Err(RenderError::AttributeNotFound(name)) => assert_eq!(name, "a_Color"),
            other => panic!("expected AttributeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn component_mismatch_is_rejected() {
        let slots = test_slots();
        assert!(matches!(
            slots.resolve("position", 2),
            Err(RenderError::InvalidParameter(_))
        ));
    }

    #[test]
    fn formats_cover_one_to_four_components() {
        assert_eq!(component_format(1).unwrap(), Format::R32_SFLOAT);
        assert_eq!(component_format(3).unwrap(), Format::R32G32B32_SFLOAT);
        assert!(matches!(
            component_format(0),
            Err(RenderError::InvalidParameter(_))
        ));
        assert!(matches!(
            component_format(5),
            Err(RenderError::InvalidParameter(_))
        ));
    }

    #[test]
    fn ragged_attribute_data_is_rejected() {
        assert!(check_attribute_data(&[1.0, 2.0, 3.0], 3).is_ok());
        assert!(matches!(
            check_attribute_data(&[1.0, 2.0, 3.0, 4.0], 3),
            Err(RenderError::InvalidParameter(_))
        ));
        assert!(matches!(
            check_attribute_data(&[], 3),
            Err(RenderError::InvalidParameter(_))
        ));
    }
}
