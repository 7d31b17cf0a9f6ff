//! Boot status over defmt
//!
//! There is no panel on the boat; the "display" is the RTT log.

use defmt::{error, info, warn};
use nereid_core::traits::{BootDisplay, BootStage, FaultScreen};

pub struct DefmtDisplay;

impl BootDisplay for DefmtDisplay {
    fn boot_progress(&mut self, stage: BootStage, done: bool) {
        if done {
            info!("boot: {:?} ok", stage);
        } else {
            info!("boot: {:?}...", stage);
        }
    }

    fn fault(&mut self, fault: FaultScreen) {
        error!("boot fault: {:?}", fault);
    }

    fn emergency(&mut self) {
        warn!("EMERGENCY BLOW");
    }
}
