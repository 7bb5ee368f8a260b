//! Vulkan logical device, queues, memory allocator and transfer helpers.
//!
//! The [`Device`] is shared as `Arc<Device>` by every GPU object in the
//! workspace: buffers, sync objects, pipelines, the swapchain, meshes and
//! render systems. Holding the `Arc` is what keeps the logical device alive,
//! and the device in turn keeps its [`Instance`] alive, so destruction order
//! between those three is enforced by reference counts rather than by
//! convention.
//!
//! # Example
//!
//! ```no_run
//! use vista_rhi::device::Device;
//! use vista_rhi::instance::Instance;
//! use vista_rhi::physical_device::select_physical_device;
//! use ash::vk;
//!
//! # fn example(surface: vk::SurfaceKHR) -> Result<(), vista_rhi::RhiError> {
//! let instance = Instance::new(c"vista", false, &[])?;
//! let surface_loader = ash::khr::surface::Instance::new(instance.entry(), instance.handle());
//! let info = select_physical_device(instance.handle(), surface, &surface_loader)?;
//!
//! let device = Device::new(&instance, &info)?;
//! device.wait_idle()?;
//! # Ok(())
//! # }
//! ```

use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use tracing::{debug, error, info};

use crate::error::{RhiError, RhiResult};
use crate::instance::Instance;
use crate::physical_device::{PhysicalDeviceInfo, QueueFamilyIndices};

/// Required device extensions.
const DEVICE_EXTENSIONS: &[&std::ffi::CStr] = &[ash::khr::swapchain::NAME];

/// Vulkan logical device wrapper.
///
/// # Thread Safety
///
/// The allocator and the transfer command pool are behind mutexes. Queue
/// submission is not synchronized; the frame loop submits from one thread.
pub struct Device {
    device: ash::Device,
    instance: Arc<Instance>,
    physical_device: vk::PhysicalDevice,
    properties: vk::PhysicalDeviceProperties,
    allocator: ManuallyDrop<Mutex<Allocator>>,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    queue_families: QueueFamilyIndices,
    /// Pool for short-lived transfer command buffers.
    transfer_pool: Mutex<vk::CommandPool>,
}

impl Device {
    /// Creates the logical device, its queues, the memory allocator and a
    /// transient command pool for uploads.
    ///
    /// # Errors
    ///
    /// Returns an error if device, allocator or pool creation fails.
    pub fn new(instance: &Arc<Instance>, info: &PhysicalDeviceInfo) -> RhiResult<Arc<Self>> {
        let families = info.queue_families;
        let (Some(graphics_family), Some(present_family)) =
            (families.graphics_family, families.present_family)
        else {
            return Err(RhiError::NoSuitableGpu);
        };

        let queue_priorities = [1.0f32];
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = families
            .unique_families()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
            })
            .collect();

        let extension_names: Vec<*const std::ffi::c_char> =
            DEVICE_EXTENSIONS.iter().map(|ext| ext.as_ptr()).collect();
        let features = vk::PhysicalDeviceFeatures::default();

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extension_names)
            .enabled_features(&features);

        let device = unsafe {
            instance
                .handle()
                .create_device(info.device, &create_info, None)?
        };
        info!("Logical device created on '{}'", info.device_name());

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };
        debug!(
            "Queues: graphics family {}, present family {}",
            graphics_family, present_family
        );

        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(
                vk::CommandPoolCreateFlags::TRANSIENT
                    | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
            )
            .queue_family_index(graphics_family);
        let transfer_pool = unsafe { device.create_command_pool(&pool_info, None)? };

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.handle().clone(),
            device: device.clone(),
            physical_device: info.device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })?;
        debug!("GPU memory allocator initialized");

        Ok(Arc::new(Self {
            device,
            instance: instance.clone(),
            physical_device: info.device,
            properties: info.properties,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            graphics_queue,
            present_queue,
            queue_families: families,
            transfer_pool: Mutex::new(transfer_pool),
        }))
    }

    /// Returns the Vulkan logical device handle.
    #[inline]
    pub fn handle(&self) -> &ash::Device {
        &self.device
    }

    /// Returns the instance this device was created from.
    #[inline]
    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// Returns the physical device handle.
    #[inline]
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Returns the physical device properties.
    #[inline]
    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }

    /// Returns the graphics queue handle.
    #[inline]
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// Returns the presentation queue handle.
    #[inline]
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    /// Returns the queue family indices.
    #[inline]
    pub fn queue_families(&self) -> &QueueFamilyIndices {
        &self.queue_families
    }

    /// Returns the GPU memory allocator.
    #[inline]
    pub fn allocator(&self) -> &Mutex<Allocator> {
        &self.allocator
    }

    /// Blocks until every queue on the device is idle.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait fails (typically device loss).
    pub fn wait_idle(&self) -> RhiResult<()> {
        unsafe { self.device.device_wait_idle()? };
        Ok(())
    }

    /// Blocks until `fence` is signaled or `timeout` nanoseconds pass.
    ///
    /// # Errors
    ///
    /// Returns an error on timeout or device loss.
    pub fn wait_for_fence(&self, fence: vk::Fence, timeout: u64) -> RhiResult<()> {
        unsafe { self.device.wait_for_fences(&[fence], true, timeout)? };
        Ok(())
    }

    /// Submits work to the graphics queue.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    /// - All command buffers are valid and fully recorded
    /// - Wait and signal semaphores follow the frame protocol
    /// - `fence` is unsignaled and not in use by another submission
    ///
    /// # Errors
    ///
    /// Returns an error if the submission fails.
    pub unsafe fn submit_graphics(
        &self,
        submit_infos: &[vk::SubmitInfo],
        fence: vk::Fence,
    ) -> RhiResult<()> {
        unsafe {
            self.device
                .queue_submit(self.graphics_queue, submit_infos, fence)?;
        }
        Ok(())
    }

    /// Returns the first candidate format supporting `features` with `tiling`.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::SwapchainError`] if none qualifies.
    pub fn find_supported_format(
        &self,
        candidates: &[vk::Format],
        tiling: vk::ImageTiling,
        features: vk::FormatFeatureFlags,
    ) -> RhiResult<vk::Format> {
        pick_supported_format(candidates, tiling, features, |format| unsafe {
            self.instance
                .handle()
                .get_physical_device_format_properties(self.physical_device, format)
        })
        .ok_or_else(|| {
            RhiError::SwapchainError(format!(
                "None of {candidates:?} supports {features:?} with {tiling:?} tiling"
            ))
        })
    }

    /// Records commands into a one-shot command buffer, submits it to the
    /// graphics queue and waits for the queue to drain.
    ///
    /// # Errors
    ///
    /// Returns an error if allocation, recording or submission fails.
    pub fn execute_one_time<F>(&self, record: F) -> RhiResult<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let pool = self
            .transfer_pool
            .lock()
            .map_err(|_| RhiError::BufferError("Transfer pool lock poisoned".to_string()))?;

        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(*pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffer = unsafe { self.device.allocate_command_buffers(&alloc_info)?[0] };

        let result = (|| -> RhiResult<()> {
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            unsafe { self.device.begin_command_buffer(command_buffer, &begin_info)? };

            record(&self.device, command_buffer);

            let command_buffers = [command_buffer];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            unsafe {
                self.device.end_command_buffer(command_buffer)?;
                self.device
                    .queue_submit(self.graphics_queue, &[submit_info], vk::Fence::null())?;
                self.device.queue_wait_idle(self.graphics_queue)?;
            }
            Ok(())
        })();

        unsafe { self.device.free_command_buffers(*pool, &[command_buffer]) };
        result
    }

    /// Copies `size` bytes from the start of `src` to the start of `dst`.
    ///
    /// Blocks until the copy has completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer submission fails.
    pub fn copy_buffer(&self, src: vk::Buffer, dst: vk::Buffer, size: vk::DeviceSize) -> RhiResult<()> {
        self.execute_one_time(|device, command_buffer| {
            let region = vk::BufferCopy::default().size(size);
            unsafe { device.cmd_copy_buffer(command_buffer, src, dst, &[region]) };
        })?;
        debug!("Copied {} bytes between buffers", size);
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                error!("Failed to wait for device idle during drop: {:?}", e);
            }

            // Free allocator memory blocks while the device is still alive.
            ManuallyDrop::drop(&mut self.allocator);

            if let Ok(pool) = self.transfer_pool.lock() {
                self.device.destroy_command_pool(*pool, None);
            }
            self.device.destroy_device(None);
        }
        info!("Logical device destroyed");
    }
}

// ash::Device is a function table; mutable state sits behind mutexes.
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

/// Format selection shared by depth-format lookup and tests.
pub(crate) fn pick_supported_format(
    candidates: &[vk::Format],
    tiling: vk::ImageTiling,
    features: vk::FormatFeatureFlags,
    mut properties: impl FnMut(vk::Format) -> vk::FormatProperties,
) -> Option<vk::Format> {
    candidates.iter().copied().find(|&format| {
        let props = properties(format);
        match tiling {
            vk::ImageTiling::LINEAR => props.linear_tiling_features.contains(features),
            vk::ImageTiling::OPTIMAL => props.optimal_tiling_features.contains(features),
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_extensions_defined() {
        assert_eq!(DEVICE_EXTENSIONS, &[ash::khr::swapchain::NAME]);
    }

    #[test]
    fn test_device_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Device>();
    }

    #[test]
    fn test_pick_supported_format_respects_tiling() {
        let depth = vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT;
        let props = |format: vk::Format| match format {
            vk::Format::D32_SFLOAT => vk::FormatProperties {
                linear_tiling_features: depth,
                ..Default::default()
            },
            vk::Format::D24_UNORM_S8_UINT => vk::FormatProperties {
                optimal_tiling_features: depth,
                ..Default::default()
            },
            _ => vk::FormatProperties::default(),
        };
        let candidates = [
            vk::Format::D32_SFLOAT,
            vk::Format::D32_SFLOAT_S8_UINT,
            vk::Format::D24_UNORM_S8_UINT,
        ];

        assert_eq!(
            pick_supported_format(&candidates, vk::ImageTiling::OPTIMAL, depth, props),
            Some(vk::Format::D24_UNORM_S8_UINT)
        );
        assert_eq!(
            pick_supported_format(&candidates, vk::ImageTiling::LINEAR, depth, props),
            Some(vk::Format::D32_SFLOAT)
        );
        assert_eq!(
            pick_supported_format(&candidates[1..2], vk::ImageTiling::OPTIMAL, depth, props),
            None
        );
    }
}
