//! Feature resolution: collapse a variant's raw table, which may carry
//! alternative descriptors per signal, into exactly one binding per signal
//! for the active feature flags.

use tracing::debug;

use super::descriptor::{Binding, CompositeBinding, ResourceDescriptor};
use super::pwm::{PwmConfig, PwmFrequency};
use super::signal::{LogicalSignal, SignalClass};
use super::tables::{SerialVectors, SignalSpec};
use super::{BindingError, BoardVariant, FeatureFlags};

/// Numeric configuration overrides applied during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Overrides {
    pub pwm_min_value: u8,
    pub pwm_frequency: PwmFrequency,
    /// Control inputs whose readings are inverted. `None` inverts the
    /// whole control group, matching the default invert mask.
    pub control_invert: Option<Vec<LogicalSignal>>,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            pwm_min_value: 1,
            pwm_frequency: PwmFrequency::default(),
            control_invert: None,
        }
    }
}

/// The output of resolution: one binding per logical signal, the derived
/// PWM parameters, and per-variant metadata. Computed once per
/// configuration pass and read-only afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBindingSet {
    pub variant: BoardVariant,
    pub flags: FeatureFlags,
    bindings: [Binding; LogicalSignal::COUNT],
    pub control_invert_mask: u8,
    pub pwm: Option<PwmConfig>,
    pub serial: SerialVectors,
}

impl ResolvedBindingSet {
    pub fn binding(&self, signal: LogicalSignal) -> &Binding {
        &self.bindings[signal.index()]
    }

    pub fn descriptor(&self, signal: LogicalSignal) -> Option<&ResourceDescriptor> {
        self.bindings[signal.index()].descriptor()
    }

    /// Bound members of a co-located class, in declaration order.
    pub fn members(&self, class: SignalClass) -> Vec<(LogicalSignal, &ResourceDescriptor)> {
        LogicalSignal::ALL
            .iter()
            .filter(|s| s.class() == Some(class))
            .filter_map(|s| self.descriptor(*s).map(|d| (*s, d)))
            .collect()
    }

    /// Group view over a class: shared port, direction register, union
    /// mask, and interrupt bank. Meaningful once validation has passed.
    pub fn group(&self, class: SignalClass) -> CompositeBinding {
        let members = self.members(class);
        let first = members
            .first()
            .map(|(_, d)| **d)
            .expect("every signal class has at least one bound member");
        CompositeBinding {
            port: first.port,
            ddr: first.ddr,
            mask: members.iter().fold(0, |mask, (_, d)| mask | d.mask),
            interrupt: first.interrupt,
        }
    }

    pub fn probe_mask(&self) -> u8 {
        self.descriptor(LogicalSignal::Probe).map_or(0, |d| d.mask)
    }
}

/// Signals a variant is allowed to leave unbound. Everything else must
/// resolve to a concrete descriptor.
pub(crate) fn optional(signal: LogicalSignal) -> bool {
    matches!(
        signal,
        LogicalSignal::SpindleDirection
            | LogicalSignal::SpindlePwm
            | LogicalSignal::CoolantMist
            | LogicalSignal::ControlSafetyDoor
    )
}

/// Pairs deliberately routed to one physical pin: the spindle enable rides
/// the PWM pin on boards without a spare output, and the safety door shares
/// the feed-hold input.
pub(crate) fn allowed_share(a: LogicalSignal, b: LogicalSignal) -> bool {
    let pair = |x, y| (a == x && b == y) || (a == y && b == x);
    pair(LogicalSignal::SpindleEnable, LogicalSignal::SpindlePwm)
        || pair(LogicalSignal::ControlFeedHold, LogicalSignal::ControlSafetyDoor)
}

/// Resolve one of the supported board variants.
pub fn resolve(
    variant: BoardVariant,
    flags: FeatureFlags,
    overrides: &Overrides,
) -> Result<ResolvedBindingSet, BindingError> {
    resolve_table(variant, variant.table(), flags, overrides)
}

/// Resolve an explicit table. Split out from [`resolve`] so malformed
/// tables can be exercised directly.
pub fn resolve_table(
    variant: BoardVariant,
    table: &[SignalSpec],
    flags: FeatureFlags,
    overrides: &Overrides,
) -> Result<ResolvedBindingSet, BindingError> {
    let mut bindings = [Binding::Absent; LogicalSignal::COUNT];
    let mut feature_selected = [false; LogicalSignal::COUNT];

    for signal in LogicalSignal::ALL {
        let row = table
            .iter()
            .find(|spec| spec.signal == signal)
            .ok_or(BindingError::UnmappedSignal { variant, signal })?;

        let mut chosen = row.default;
        for (when, alternate) in row.alternates {
            if when.active(&flags) {
                chosen = *alternate;
                feature_selected[signal.index()] = true;
                break;
            }
        }

        match chosen {
            Some(descriptor) => {
                debug!(
                    signal = ?signal,
                    port = %descriptor.port,
                    bit = descriptor.bit,
                    note = descriptor.pin_note,
                    "bound"
                );
                bindings[signal.index()] = Binding::Single(descriptor);
            }
            None if optional(signal) => bindings[signal.index()] = Binding::Absent,
            None => return Err(BindingError::UnmappedSignal { variant, signal }),
        }
    }

    check_feature_claims(&bindings, &feature_selected)?;

    let pwm = if flags.variable_spindle {
        let output = *bindings[LogicalSignal::SpindlePwm.index()]
            .descriptor()
            .ok_or(BindingError::UnmappedSignal {
                variant,
                signal: LogicalSignal::SpindlePwm,
            })?;
        Some(PwmConfig::derive(
            variant,
            output,
            overrides.pwm_min_value,
            overrides.pwm_frequency,
        )?)
    } else {
        None
    };

    let control_invert_mask = control_invert_mask(&bindings, overrides)?;

    Ok(ResolvedBindingSet {
        variant,
        flags,
        bindings,
        control_invert_mask,
        pwm,
        serial: variant.serial_vectors(),
    })
}

/// Reject selections where enabled features drive two unrelated signals
/// onto one physical bit. Overlaps between plain defaults are an authoring
/// defect and are left for the validator's mask checks.
fn check_feature_claims(
    bindings: &[Binding; LogicalSignal::COUNT],
    feature_selected: &[bool; LogicalSignal::COUNT],
) -> Result<(), BindingError> {
    let bound: Vec<(LogicalSignal, &ResourceDescriptor)> = LogicalSignal::ALL
        .iter()
        .filter_map(|s| bindings[s.index()].descriptor().map(|d| (*s, d)))
        .collect();

    for (i, (first, a)) in bound.iter().enumerate() {
        for (second, b) in &bound[i + 1..] {
            if a.port != b.port || a.bit != b.bit || allowed_share(*first, *second) {
                continue;
            }
            if feature_selected[first.index()] || feature_selected[second.index()] {
                return Err(BindingError::ConflictingFeatureSelection {
                    first: *first,
                    second: *second,
                    port: a.port,
                    bit: a.bit,
                });
            }
        }
    }
    Ok(())
}

fn control_invert_mask(
    bindings: &[Binding; LogicalSignal::COUNT],
    overrides: &Overrides,
) -> Result<u8, BindingError> {
    let group_mask = LogicalSignal::ALL
        .iter()
        .filter(|s| s.class() == Some(SignalClass::Control))
        .filter_map(|s| bindings[s.index()].descriptor())
        .fold(0u8, |mask, d| mask | d.mask);

    match &overrides.control_invert {
        None => Ok(group_mask),
        Some(signals) => {
            let mut mask = 0u8;
            for signal in signals {
                if signal.class() != Some(SignalClass::Control) {
                    return Err(BindingError::InconsistentBinding {
                        group: "control".to_string(),
                        reason: format!("{:?} is not a control input", signal),
                    });
                }
                let descriptor = bindings[signal.index()].descriptor().ok_or_else(|| {
                    BindingError::InconsistentBinding {
                        group: "control".to_string(),
                        reason: format!("{:?} named in invert list but unbound", signal),
                    }
                })?;
                mask |= descriptor.mask;
            }
            Ok(mask)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::descriptor::{pin, PortGroup};
    use crate::board::tables::When;

    fn flags() -> FeatureFlags {
        FeatureFlags::default()
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let set_a = resolve(BoardVariant::Compact, flags(), &Overrides::default()).unwrap();
        let set_b = resolve(BoardVariant::Compact, flags(), &Overrides::default()).unwrap();
        assert_eq!(set_a, set_b);
    }

    #[test]
    fn test_default_flags_leave_pwm_unbound() {
        let set = resolve(BoardVariant::Compact, flags(), &Overrides::default()).unwrap();
        assert!(set.binding(LogicalSignal::SpindlePwm).is_absent());
        assert!(set.pwm.is_none());
        // Binary spindle enable sits on its dedicated pin.
        assert_eq!(set.descriptor(LogicalSignal::SpindleEnable).unwrap().bit, 4);
    }

    #[test]
    fn test_variable_spindle_moves_z_limit_and_enable() {
        let mut f = flags();
        f.variable_spindle = true;
        let set = resolve(BoardVariant::Compact, f, &Overrides::default()).unwrap();
        assert_eq!(set.descriptor(LogicalSignal::ZLimit).unwrap().bit, 4);
        assert_eq!(set.descriptor(LogicalSignal::SpindleEnable).unwrap().bit, 3);
        let pwm = set.pwm.unwrap();
        assert_eq!(pwm.output.bit, 3);
        assert_eq!(pwm.range, 254);
    }

    #[test]
    fn test_dir_as_enable_swaps_descriptors() {
        let mut f = flags();
        f.variable_spindle = true;
        f.spindle_dir_as_enable = true;
        let set = resolve(BoardVariant::Compact, f, &Overrides::default()).unwrap();

        let default_dir = resolve(BoardVariant::Compact, flags(), &Overrides::default())
            .unwrap()
            .descriptor(LogicalSignal::SpindleDirection)
            .copied()
            .unwrap();
        assert!(set.binding(LogicalSignal::SpindleDirection).is_absent());
        assert_eq!(*set.descriptor(LogicalSignal::SpindleEnable).unwrap(), default_dir);
    }

    #[test]
    fn test_mist_and_safety_door_gating() {
        let set = resolve(BoardVariant::Extended, flags(), &Overrides::default()).unwrap();
        assert!(set.binding(LogicalSignal::CoolantMist).is_absent());
        // Shared by default.
        let door = set.descriptor(LogicalSignal::ControlSafetyDoor).unwrap();
        let hold = set.descriptor(LogicalSignal::ControlFeedHold).unwrap();
        assert_eq!(door, hold);

        let mut f = flags();
        f.mist_coolant = true;
        f.safety_door_shares_feed_hold = false;
        let set = resolve(BoardVariant::Extended, f, &Overrides::default()).unwrap();
        assert_eq!(set.descriptor(LogicalSignal::CoolantMist).unwrap().bit, 6);
        assert!(set.binding(LogicalSignal::ControlSafetyDoor).is_absent());
    }

    #[test]
    fn test_group_masks() {
        let set = resolve(BoardVariant::Compact, flags(), &Overrides::default()).unwrap();
        let steps = set.group(SignalClass::Step);
        assert_eq!(steps.port, PortGroup::D);
        assert_eq!(steps.mask, 0b0001_1100);
        let controls = set.group(SignalClass::Control);
        assert_eq!(controls.mask, 0b0000_0111 | 0b0000_0010);
        assert_eq!(set.control_invert_mask, controls.mask);
        assert_eq!(set.probe_mask(), 1 << 5);
    }

    #[test]
    fn test_control_invert_subset() {
        let overrides = Overrides {
            control_invert: Some(vec![LogicalSignal::ControlReset]),
            ..Overrides::default()
        };
        let set = resolve(BoardVariant::Compact, flags(), &overrides).unwrap();
        assert_eq!(set.control_invert_mask, 1);

        let bad = Overrides {
            control_invert: Some(vec![LogicalSignal::Probe]),
            ..Overrides::default()
        };
        let err = resolve(BoardVariant::Compact, flags(), &bad).unwrap_err();
        assert!(matches!(err, BindingError::InconsistentBinding { .. }));
    }

    const MIST_ON_FLOOD: &[(When, Option<crate::board::descriptor::ResourceDescriptor>)] =
        &[(When::MistCoolant, Some(pin(PortGroup::C, 3, "Uno Analog Pin 3")))];

    #[test]
    fn test_feature_claim_conflict_detected() {
        // Contrived table: mist coolant lands on the flood pin.
        let mut table = BoardVariant::Compact.table().to_vec();
        for spec in &mut table {
            if spec.signal == LogicalSignal::CoolantMist {
                spec.alternates = MIST_ON_FLOOD;
            }
        }
        let mut f = flags();
        f.mist_coolant = true;
        let err = resolve_table(BoardVariant::Compact, &table, f, &Overrides::default())
            .unwrap_err();
        match err {
            BindingError::ConflictingFeatureSelection { port, bit, .. } => {
                assert_eq!(port, PortGroup::C);
                assert_eq!(bit, 3);
            }
            other => panic!("expected feature conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_row_is_unmapped() {
        let table: Vec<SignalSpec> = BoardVariant::Compact
            .table()
            .iter()
            .filter(|spec| spec.signal != LogicalSignal::Probe)
            .copied()
            .collect();
        let err = resolve_table(BoardVariant::Compact, &table, flags(), &Overrides::default())
            .unwrap_err();
        assert!(matches!(
            err,
            BindingError::UnmappedSignal { signal: LogicalSignal::Probe, .. }
        ));
    }
}
