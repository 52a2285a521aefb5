//! Logical signal vocabulary. These names are the fixed interface between
//! the binding layer and the stepper/limit/spindle/control drivers built on
//! top of it; physical pin assignment is a per-variant concern.

/// A named hardware function independent of physical pin assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicalSignal {
    XStep,
    YStep,
    ZStep,
    XDirection,
    YDirection,
    ZDirection,
    StepperEnable,
    XLimit,
    YLimit,
    ZLimit,
    SpindleEnable,
    SpindleDirection,
    SpindlePwm,
    CoolantFlood,
    CoolantMist,
    ControlReset,
    ControlFeedHold,
    ControlCycleStart,
    ControlSafetyDoor,
    Probe,
}

/// Signal classes whose members must share one port for simultaneous
/// register-wide access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalClass {
    Step,
    Direction,
    Limit,
    Control,
}

impl SignalClass {
    pub const ALL: [SignalClass; 4] = [
        SignalClass::Step,
        SignalClass::Direction,
        SignalClass::Limit,
        SignalClass::Control,
    ];

    /// Edge-sensitive input groups carry pin-change interrupt plumbing;
    /// step and direction groups are plain outputs.
    pub fn interrupt_driven(self) -> bool {
        matches!(self, SignalClass::Limit | SignalClass::Control)
    }
}

impl LogicalSignal {
    pub const COUNT: usize = 20;

    pub const ALL: [LogicalSignal; LogicalSignal::COUNT] = [
        LogicalSignal::XStep,
        LogicalSignal::YStep,
        LogicalSignal::ZStep,
        LogicalSignal::XDirection,
        LogicalSignal::YDirection,
        LogicalSignal::ZDirection,
        LogicalSignal::StepperEnable,
        LogicalSignal::XLimit,
        LogicalSignal::YLimit,
        LogicalSignal::ZLimit,
        LogicalSignal::SpindleEnable,
        LogicalSignal::SpindleDirection,
        LogicalSignal::SpindlePwm,
        LogicalSignal::CoolantFlood,
        LogicalSignal::CoolantMist,
        LogicalSignal::ControlReset,
        LogicalSignal::ControlFeedHold,
        LogicalSignal::ControlCycleStart,
        LogicalSignal::ControlSafetyDoor,
        LogicalSignal::Probe,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Co-location class, or `None` for signals that stand alone.
    pub fn class(self) -> Option<SignalClass> {
        match self {
            LogicalSignal::XStep | LogicalSignal::YStep | LogicalSignal::ZStep => {
                Some(SignalClass::Step)
            }
            LogicalSignal::XDirection | LogicalSignal::YDirection | LogicalSignal::ZDirection => {
                Some(SignalClass::Direction)
            }
            LogicalSignal::XLimit | LogicalSignal::YLimit | LogicalSignal::ZLimit => {
                Some(SignalClass::Limit)
            }
            LogicalSignal::ControlReset
            | LogicalSignal::ControlFeedHold
            | LogicalSignal::ControlCycleStart
            | LogicalSignal::ControlSafetyDoor => Some(SignalClass::Control),
            _ => None,
        }
    }

    /// Input signals are read through the port's input latch; everything
    /// else drives the output latch.
    pub fn is_input(self) -> bool {
        matches!(
            self.class(),
            Some(SignalClass::Limit) | Some(SignalClass::Control)
        ) || self == LogicalSignal::Probe
    }
}
