use crate::{
    capture::CameraSnapshot,
    scan::{ScanRejection, ScanSnapshot, ScanTrigger},
    AppState, Page,
};

pub(crate) async fn open_scan(state: &AppState) -> Result<ScanSnapshot, String> {
    state.navigate(Page::Scan).await;
    state.with_scan(|scan| Ok(scan.snapshot()))
}

pub(crate) fn get_scan_state(state: &AppState) -> Result<ScanSnapshot, String> {
    state.with_scan(|scan| Ok(scan.snapshot()))
}

/// Starts a scan on the open scan page. A capture failure is not an error
/// here: the snapshot carries it for display.
pub(crate) fn trigger_scan(state: &AppState) -> Result<ScanSnapshot, String> {
    state.with_scan(|scan| match scan.trigger_scan() {
        ScanTrigger::Rejected(ScanRejection::AlreadyScanning) => {
            Err("A scan is already in progress".into())
        }
        ScanTrigger::Rejected(ScanRejection::CameraNotLive) => {
            Err("Camera is not ready yet".into())
        }
        ScanTrigger::CaptureFailed | ScanTrigger::Started(_) => Ok(scan.snapshot()),
    })
}

pub(crate) fn retry_camera(state: &AppState) -> Result<CameraSnapshot, String> {
    state.with_scan(|scan| {
        scan.retry_camera()
            .ok_or_else(|| "Camera has not failed; nothing to retry".to_string())?;
        Ok(scan.snapshot().camera)
    })
}
