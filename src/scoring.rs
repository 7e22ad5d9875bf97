use crate::PhysicalDeviceError;
use crate::device::{DeviceCandidate, DevicePicker};
use ash::vk;

pub type Score = i64;

const GIB: vk::DeviceSize = 1 << 30;

pub fn device_type_score(device_type: vk::PhysicalDeviceType) -> crate::Result<Score> {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => Ok(8),
        vk::PhysicalDeviceType::INTEGRATED_GPU => Ok(2),
        vk::PhysicalDeviceType::VIRTUAL_GPU => Ok(0),
        vk::PhysicalDeviceType::CPU => Ok(-2),
        vk::PhysicalDeviceType::OTHER => Ok(-8),
        unknown => Err(PhysicalDeviceError::UnrecognizedDeviceType(unknown.as_raw()).into()),
    }
}

/// Whole GiB of the largest device-local heap, 0 without one.
pub fn memory_score(heaps: &[vk::MemoryHeap]) -> Score {
    heaps
        .iter()
        .filter(|heap| heap.flags.contains(vk::MemoryHeapFlags::DEVICE_LOCAL))
        .map(|heap| heap.size)
        .max()
        .map_or(0, |size| (size / GIB) as Score)
}

pub fn score(candidate: &DeviceCandidate) -> crate::Result<Score> {
    Ok(device_type_score(candidate.device_type())? + memory_score(candidate.memory_heaps()))
}

/// Default picker: highest score, earliest candidate on ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringPicker;

impl DevicePicker for ScoringPicker {
    fn pick(&self, candidates: &[DeviceCandidate]) -> crate::Result<usize> {
        let mut best: Option<(usize, Score)> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            let score = score(candidate)?;

            #[cfg(feature = "enable_tracing")]
            tracing::debug!("{} scored {score}", candidate.name());

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        best.map(|(index, _)| index)
            .ok_or_else(|| PhysicalDeviceError::NoCompatibleDevice.into())
    }
}
