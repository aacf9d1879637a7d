//! Bridge self-description.

use ecu_bridge_macros::native;

#[native]
pub fn get_bridge_info() -> &'static str {
    log::info!(target: crate::DEFAULT_TAG, "providing bridge information");
    "Native Bridge: Active and ready for ECU communication"
}
