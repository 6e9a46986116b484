//! C ABI exports for the port manager.
//!
//! The manager is registered per thread; a call made with nothing
//! registered returns `SWITCH_STATUS_UNINITIALIZED`.

use std::cell::RefCell;
use std::sync::Arc;

use switchapi_pd::{SwitchStatus, SwitchStatusExt};
use switchapi_types::{PacketType, RawHandle, SwitchDevice, SwitchHandle};

use super::manager::PortManager;

thread_local! {
    static PORT_MANAGER: RefCell<Option<Arc<PortManager>>> = const { RefCell::new(None) };
}

/// Makes `manager` reachable from the C entry points on this thread.
pub fn register_port_manager(manager: Arc<PortManager>) {
    PORT_MANAGER.with(|cell| {
        *cell.borrow_mut() = Some(manager);
    });
}

pub fn unregister_port_manager() {
    PORT_MANAGER.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

fn with_manager<F>(f: F) -> i32
where
    F: FnOnce(&PortManager) -> SwitchStatus,
{
    PORT_MANAGER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|manager| f(manager.as_ref()))
            .unwrap_or(SwitchStatus::Uninitialized)
            .as_raw()
    })
}

#[no_mangle]
pub extern "C" fn switch_api_port_is_registered() -> bool {
    PORT_MANAGER.with(|cell| cell.borrow().is_some())
}

/// Binds or unbinds a storm-control meter. `meter` 0 unbinds.
#[no_mangle]
pub extern "C" fn switch_api_port_storm_control_set(
    device: SwitchDevice,
    port: RawHandle,
    pkt_type: u32,
    meter: RawHandle,
) -> i32 {
    let Some(pkt_type) = PacketType::from_raw(pkt_type) else {
        return SwitchStatus::InvalidParameter.as_raw();
    };
    with_manager(|manager| {
        manager
            .storm_control_set(
                device,
                SwitchHandle::from_raw(port),
                pkt_type,
                SwitchHandle::from_raw(meter),
            )
            .to_status()
    })
}

/// Reads the meter bound for `pkt_type` into `meter`.
///
/// # Safety
///
/// - `meter` must be null or valid for a `u64` write
#[no_mangle]
pub unsafe extern "C" fn switch_api_port_storm_control_get(
    device: SwitchDevice,
    port: RawHandle,
    pkt_type: u32,
    meter: *mut RawHandle,
) -> i32 {
    if meter.is_null() {
        return SwitchStatus::InvalidParameter.as_raw();
    }
    let Some(pkt_type) = PacketType::from_raw(pkt_type) else {
        return SwitchStatus::InvalidParameter.as_raw();
    };
    with_manager(|manager| {
        match manager.storm_control_get(device, SwitchHandle::from_raw(port), pkt_type) {
            Ok(handle) => {
                *meter = handle.as_raw();
                SwitchStatus::Success
            }
            Err(e) => e.status(),
        }
    })
}

#[no_mangle]
pub extern "C" fn switch_api_port_delete(device: SwitchDevice, port: RawHandle) -> i32 {
    with_manager(|manager| {
        manager
            .delete(device, SwitchHandle::from_raw(port))
            .to_status()
    })
}

#[no_mangle]
pub extern "C" fn switch_api_port_print_entry(port: u32) -> i32 {
    with_manager(|manager| manager.print_entry(port).to_status())
}

#[no_mangle]
pub extern "C" fn switch_api_port_print_all() -> i32 {
    with_manager(|manager| manager.print_all().to_status())
}

/// Returns false when nothing is registered.
#[no_mangle]
pub extern "C" fn switch_port_is_cpu_port(port: RawHandle) -> bool {
    PORT_MANAGER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|manager| manager.is_cpu_port(SwitchHandle::from_raw(port)))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    use switchapi_pd::{MeterTable, SimulatedPd};
    use switchapi_types::HandleType;

    use crate::port::PortManagerConfig;

    fn register() {
        let config = PortManagerConfig {
            max_ports: 8,
            cpu_port: 0,
            ..Default::default()
        };
        let manager = PortManager::new(
            config,
            Arc::new(SimulatedPd::new()),
            Arc::new(MeterTable::new()),
        )
        .unwrap();
        manager.init(0).unwrap();
        register_port_manager(Arc::new(manager));
    }

    fn port(id: u32) -> RawHandle {
        SwitchHandle::new(HandleType::Port, id).as_raw()
    }

    #[test]
    fn test_register_unregister() {
        unregister_port_manager();
        assert!(!switch_api_port_is_registered());

        register();
        assert!(switch_api_port_is_registered());

        unregister_port_manager();
        assert!(!switch_api_port_is_registered());
    }

    #[test]
    fn test_unregistered_status() {
        unregister_port_manager();
        assert_eq!(
            switch_api_port_delete(0, port(1)),
            SwitchStatus::Uninitialized.as_raw()
        );
        assert_eq!(
            switch_api_port_print_all(),
            SwitchStatus::Uninitialized.as_raw()
        );
        assert!(!switch_port_is_cpu_port(port(0)));
    }

    #[test]
    fn test_storm_control_round_trip() {
        register();

        let status = switch_api_port_storm_control_set(0, port(3), 2, 7);
        assert_eq!(status, SwitchStatus::Success.as_raw());

        let mut meter: RawHandle = 0;
        let status = unsafe { switch_api_port_storm_control_get(0, port(3), 2, &mut meter) };
        assert_eq!(status, SwitchStatus::Success.as_raw());
        assert_eq!(meter, 7);

        assert_eq!(
            switch_api_port_storm_control_set(0, port(3), 2, 0),
            SwitchStatus::Success.as_raw()
        );
        let status = unsafe { switch_api_port_storm_control_get(0, port(3), 2, &mut meter) };
        assert_eq!(status, SwitchStatus::Success.as_raw());
        assert_eq!(meter, 0);

        unregister_port_manager();
    }

    #[test]
    fn test_invalid_arguments() {
        register();

        assert_eq!(
            switch_api_port_storm_control_set(0, port(3), 9, 7),
            SwitchStatus::InvalidParameter.as_raw()
        );
        assert_eq!(
            switch_api_port_storm_control_set(0, port(8), 0, 7),
            SwitchStatus::InvalidParameter.as_raw()
        );
        let status = unsafe { switch_api_port_storm_control_get(0, port(1), 0, ptr::null_mut()) };
        assert_eq!(status, SwitchStatus::InvalidParameter.as_raw());
        assert_eq!(
            switch_api_port_print_entry(8),
            SwitchStatus::InvalidParameter.as_raw()
        );

        unregister_port_manager();
    }

    #[test]
    fn test_is_cpu_port() {
        register();
        assert!(switch_port_is_cpu_port(port(0)));
        assert!(!switch_port_is_cpu_port(port(1)));
        unregister_port_manager();
    }
}
