//! Media capture seam.
//!
//! Webcam-driven blocks pull frames from a capture device. The engine only
//! needs enumeration and a frame stream; the actual device plumbing is
//! platform-specific and lives behind this trait.

use crate::StudioError;
use blockboard_core::SettingsStore;
use blockboard_gen::BoxFuture;
use tokio::sync::mpsc;

/// Settings key for the preferred capture device id.
pub const CAMERA_DEVICE_KEY: &str = "camera-device";

/// An available capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    pub id: String,
    pub label: String,
}

/// One captured frame, tightly packed RGBA.
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Device enumeration and frame acquisition.
pub trait MediaCapture: Send + Sync {
    fn list_devices(&self) -> BoxFuture<'_, Result<Vec<CaptureDevice>, StudioError>>;

    /// Open a live frame stream for the given device. The stream ends when
    /// the sender side is dropped.
    fn open(&self, device_id: &str)
    -> BoxFuture<'_, Result<mpsc::Receiver<CaptureFrame>, StudioError>>;
}

/// The device to open: the persisted preference when it is still connected,
/// otherwise the first available device.
pub async fn preferred_device(
    capture: &dyn MediaCapture,
    settings: &impl SettingsStore,
) -> Result<Option<CaptureDevice>, StudioError> {
    let devices = capture.list_devices().await?;
    if let Some(preferred) = settings.get(CAMERA_DEVICE_KEY) {
        if let Some(device) = devices.iter().find(|d| d.id == preferred) {
            return Ok(Some(device.clone()));
        }
    }
    Ok(devices.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockboard_core::MemorySettings;

    struct FixedDevices(Vec<CaptureDevice>);

    impl MediaCapture for FixedDevices {
        fn list_devices(&self) -> BoxFuture<'_, Result<Vec<CaptureDevice>, StudioError>> {
            let devices = self.0.clone();
            Box::pin(async move { Ok(devices) })
        }

        fn open(
            &self,
            device_id: &str,
        ) -> BoxFuture<'_, Result<mpsc::Receiver<CaptureFrame>, StudioError>> {
            let err = StudioError::CaptureUnavailable(device_id.to_string());
            Box::pin(async move { Err(err) })
        }
    }

    fn devices() -> FixedDevices {
        FixedDevices(vec![
            CaptureDevice {
                id: "cam-0".to_string(),
                label: "Front".to_string(),
            },
            CaptureDevice {
                id: "cam-1".to_string(),
                label: "Back".to_string(),
            },
        ])
    }

    #[tokio::test]
    async fn test_preferred_device_honors_setting() {
        let mut settings = MemorySettings::new();
        settings.set(CAMERA_DEVICE_KEY, "cam-1").unwrap();
        let device = preferred_device(&devices(), &settings).await.unwrap();
        assert_eq!(device.unwrap().id, "cam-1");
    }

    #[tokio::test]
    async fn test_preferred_device_falls_back_to_first() {
        let mut settings = MemorySettings::new();
        settings.set(CAMERA_DEVICE_KEY, "cam-unplugged").unwrap();
        let device = preferred_device(&devices(), &settings).await.unwrap();
        assert_eq!(device.unwrap().id, "cam-0");
    }

    #[tokio::test]
    async fn test_no_devices() {
        let settings = MemorySettings::new();
        let device = preferred_device(&FixedDevices(Vec::new()), &settings)
            .await
            .unwrap();
        assert!(device.is_none());
    }
}
