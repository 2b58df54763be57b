//! Menu dispatch: the session context written by the menu and the mapping
//! from a selection to the service it triggers.
use crate::protocol::coordinator::event_flags::EventBits;
use crate::protocol::transport::can_id::EcuRole;
use crate::protocol::ui::MenuPage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Diagnostic services, in service-menu order.
pub enum ServiceKind {
    VehicleInfo,
    ReadDtc,
    EraseDtc,
    FreezeFrame,
    LiveData,
    ReadDtcDrivingCycle,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::VehicleInfo,
        ServiceKind::ReadDtc,
        ServiceKind::EraseDtc,
        ServiceKind::FreezeFrame,
        ServiceKind::LiveData,
        ServiceKind::ReadDtcDrivingCycle,
    ];

    /// Service shown at `cursor` in the service menu.
    pub fn from_cursor(cursor: u16) -> Option<Self> {
        Self::ALL.get(cursor as usize).copied()
    }

    /// Event bit waking the task that runs this service.
    pub const fn trigger(self) -> EventBits {
        match self {
            ServiceKind::VehicleInfo => EventBits::VEHICLE_INFORMATION,
            ServiceKind::ReadDtc => EventBits::READ_DTC,
            ServiceKind::EraseDtc => EventBits::ERASE_DTC,
            ServiceKind::FreezeFrame => EventBits::FREEZE_FRAME,
            ServiceKind::LiveData => EventBits::LIVE_ALL_DATA,
            ServiceKind::ReadDtcDrivingCycle => EventBits::READ_DTC_DRIVING_CYCLE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Session selection shared with the service tasks. Only the dispatcher
/// changes the active ECU.
pub struct SessionContext {
    /// ECU every service talks to.
    pub ecu: EcuRole,
    pub page: MenuPage,
    pub ecu_cursor: u16,
    pub service_cursor: u16,
    /// `false` while a service owns the screen.
    pub on_menu: bool,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// What the dispatcher does with a menu event.
pub enum DispatchAction {
    /// Fire the trigger bit of this service.
    StartService(ServiceKind),
    /// Redraw the service menu for the newly selected ECU.
    ShowServiceMenu(EcuRole),
    /// Cursor out of range or no menu bit.
    Ignore,
}

impl SessionContext {
    /// Start-up state: ECU menu shown, ECM preselected.
    pub const fn new() -> Self {
        Self {
            ecu: EcuRole::Ecm,
            page: MenuPage::Ecu,
            ecu_cursor: 0,
            service_cursor: 0,
            on_menu: true,
        }
    }

    /// Apply one menu event bit.
    pub fn dispatch(&mut self, event: EventBits) -> DispatchAction {
        if event.contains(EventBits::SELECT_ECU_ADDRESS) {
            let Some(ecu) = EcuRole::from_cursor(self.ecu_cursor) else {
                return DispatchAction::Ignore;
            };
            self.ecu = ecu;
            self.return_to_menu();
            DispatchAction::ShowServiceMenu(ecu)
        } else if event.contains(EventBits::SELECT_CAN_COMMAND) {
            let Some(service) = ServiceKind::from_cursor(self.service_cursor) else {
                return DispatchAction::Ignore;
            };
            self.on_menu = false;
            DispatchAction::StartService(service)
        } else {
            DispatchAction::Ignore
        }
    }

    /// Service menu shown again with the cursor on the first item.
    pub fn return_to_menu(&mut self) {
        self.page = MenuPage::Services;
        self.service_cursor = 0;
        self.on_menu = true;
    }
}
