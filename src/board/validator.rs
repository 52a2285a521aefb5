//! Post-resolution consistency checks. A failure here is an authoring
//! defect in a variant table, not a runtime condition, and aborts
//! configuration before any hardware setup runs.

use tracing::trace;

use super::resolver::{allowed_share, optional, ResolvedBindingSet};
use super::signal::{LogicalSignal, SignalClass};
use super::BindingError;

fn inconsistent(group: &str, reason: String) -> BindingError {
    BindingError::InconsistentBinding {
        group: group.to_string(),
        reason,
    }
}

/// Verify every invariant the external drivers rely on. Must pass before
/// any ISR-setup code consumes the set.
pub fn validate(set: &ResolvedBindingSet) -> Result<(), BindingError> {
    check_descriptor_shape(set)?;
    check_required_signals(set)?;
    check_groups(set)?;
    check_input_port_exclusivity(set)?;
    check_mask_overlaps(set)?;
    check_pwm(set)?;
    check_invert_mask(set)?;
    trace!(variant = ?set.variant, "binding set validated");
    Ok(())
}

fn bound(set: &ResolvedBindingSet) -> Vec<(LogicalSignal, &super::descriptor::ResourceDescriptor)> {
    LogicalSignal::ALL
        .iter()
        .filter_map(|s| set.descriptor(*s).map(|d| (*s, d)))
        .collect()
}

fn check_descriptor_shape(set: &ResolvedBindingSet) -> Result<(), BindingError> {
    for (signal, d) in bound(set) {
        if d.bit > 7 {
            return Err(inconsistent(
                "descriptor",
                format!("{:?} bit index {} out of range", signal, d.bit),
            ));
        }
        if d.mask != 1 << d.bit {
            return Err(inconsistent(
                "descriptor",
                format!("{:?} mask {:#04x} is not 1<<{}", signal, d.mask, d.bit),
            ));
        }
        if d.ddr != d.port {
            return Err(inconsistent(
                "descriptor",
                format!("{:?} direction register {} is not paired with port {}", signal, d.ddr, d.port),
            ));
        }
    }
    Ok(())
}

fn check_required_signals(set: &ResolvedBindingSet) -> Result<(), BindingError> {
    for signal in LogicalSignal::ALL {
        if set.binding(signal).is_absent() && !optional(signal) {
            return Err(BindingError::UnmappedSignal {
                variant: set.variant,
                signal,
            });
        }
    }
    Ok(())
}

fn check_groups(set: &ResolvedBindingSet) -> Result<(), BindingError> {
    for class in SignalClass::ALL {
        let members = set.members(class);
        let (_, first) = *members
            .first()
            .ok_or_else(|| inconsistent(&format!("{:?}", class), "no bound members".to_string()))?;

        for (signal, d) in &members {
            if d.port != first.port || d.ddr != first.ddr {
                return Err(inconsistent(
                    &format!("{:?}", class),
                    format!(
                        "{:?} on port {} but the group owns port {}",
                        signal, d.port, first.port
                    ),
                ));
            }
            if class.interrupt_driven() {
                if d.interrupt.is_none() || d.interrupt != first.interrupt {
                    return Err(inconsistent(
                        &format!("{:?}", class),
                        format!("{:?} not wired to the group's pin-change bank", signal),
                    ));
                }
            } else if d.interrupt.is_some() {
                return Err(inconsistent(
                    &format!("{:?}", class),
                    format!("{:?} is an output but carries interrupt plumbing", signal),
                ));
            }
        }

        // Same-bit members are only legal for the deliberate shared pairs,
        // so the composite mask is the true union of its members.
        for (i, (sig_a, a)) in members.iter().enumerate() {
            for (sig_b, b) in &members[i + 1..] {
                if a.bit == b.bit && !allowed_share(*sig_a, *sig_b) {
                    return Err(inconsistent(
                        &format!("{:?}", class),
                        format!("{:?} and {:?} collide on bit {}", sig_a, sig_b, a.bit),
                    ));
                }
            }
        }
    }

    // Limits and controls must fire on independent vectors.
    let limit = set.group(SignalClass::Limit);
    let control = set.group(SignalClass::Control);
    if limit.interrupt == control.interrupt {
        return Err(inconsistent(
            "Limit",
            "limit and control groups share a pin-change bank".to_string(),
        ));
    }
    Ok(())
}

/// The limit port must carry no unrelated input; the control port may host
/// the probe, which is polled and has no interrupt semantics of its own.
fn check_input_port_exclusivity(set: &ResolvedBindingSet) -> Result<(), BindingError> {
    let limit_port = set.group(SignalClass::Limit).port;
    let control_port = set.group(SignalClass::Control).port;

    for (signal, d) in bound(set) {
        if !signal.is_input() {
            continue;
        }
        if d.port == limit_port && signal.class() != Some(SignalClass::Limit) {
            return Err(inconsistent(
                "Limit",
                format!("{:?} shares the limit port {}", signal, limit_port),
            ));
        }
        if d.port == control_port
            && signal.class() != Some(SignalClass::Control)
            && d.interrupt.is_some()
        {
            return Err(inconsistent(
                "Control",
                format!("{:?} shares the control port {} with its own interrupt", signal, control_port),
            ));
        }
    }
    Ok(())
}

fn check_mask_overlaps(set: &ResolvedBindingSet) -> Result<(), BindingError> {
    let bound = bound(set);
    for (i, (sig_a, a)) in bound.iter().enumerate() {
        for (sig_b, b) in &bound[i + 1..] {
            if a.port == b.port && a.mask & b.mask != 0 && !allowed_share(*sig_a, *sig_b) {
                return Err(inconsistent(
                    "mask",
                    format!(
                        "{:?} and {:?} overlap on port {} mask {:#04x}",
                        sig_a, sig_b, a.port, a.mask & b.mask
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn check_pwm(set: &ResolvedBindingSet) -> Result<(), BindingError> {
    match (&set.pwm, set.flags.variable_spindle) {
        (None, false) => {
            if !set.binding(LogicalSignal::SpindlePwm).is_absent() {
                return Err(inconsistent(
                    "spindle_pwm",
                    "PWM pin bound while variable spindle is disabled".to_string(),
                ));
            }
            Ok(())
        }
        (Some(pwm), true) => {
            if pwm.min_value == 0 || pwm.min_value >= pwm.max_value {
                return Err(inconsistent(
                    "spindle_pwm",
                    format!("min {} / max {} out of order", pwm.min_value, pwm.max_value),
                ));
            }
            if pwm.range != pwm.max_value - pwm.min_value {
                return Err(inconsistent(
                    "spindle_pwm",
                    "range does not match max - min".to_string(),
                ));
            }
            if pwm.off_value >= pwm.min_value {
                return Err(inconsistent(
                    "spindle_pwm",
                    "off value not distinct from minimum duty".to_string(),
                ));
            }
            match set.descriptor(LogicalSignal::SpindlePwm) {
                Some(d) if *d == pwm.output => Ok(()),
                _ => Err(inconsistent(
                    "spindle_pwm",
                    "PWM output does not match the resolved SpindlePwm binding".to_string(),
                )),
            }
        }
        (Some(_), false) => Err(inconsistent(
            "spindle_pwm",
            "PWM parameters derived while variable spindle is disabled".to_string(),
        )),
        (None, true) => Err(inconsistent(
            "spindle_pwm",
            "variable spindle enabled but no PWM parameters derived".to_string(),
        )),
    }
}

fn check_invert_mask(set: &ResolvedBindingSet) -> Result<(), BindingError> {
    let control_mask = set.group(SignalClass::Control).mask;
    if set.control_invert_mask & !control_mask != 0 {
        return Err(inconsistent(
            "control",
            format!(
                "invert mask {:#04x} reaches outside the control mask {:#04x}",
                set.control_invert_mask, control_mask
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::descriptor::{pin, PortGroup, ResourceDescriptor};
    use crate::board::resolver::{resolve, resolve_table, Overrides};
    use crate::board::tables::SignalSpec;
    use crate::board::{BoardVariant, FeatureFlags};

    fn patched_table(
        signal: LogicalSignal,
        replacement: Option<ResourceDescriptor>,
    ) -> Vec<SignalSpec> {
        BoardVariant::Compact
            .table()
            .iter()
            .map(|spec| {
                let mut spec = *spec;
                if spec.signal == signal {
                    spec.default = replacement;
                    spec.alternates = &[];
                }
                spec
            })
            .collect()
    }

    #[test]
    fn test_supported_variants_validate_under_all_flag_combinations() {
        for variant in [BoardVariant::Compact, BoardVariant::Extended] {
            for bits in 0..16u8 {
                let flags = FeatureFlags {
                    variable_spindle: bits & 1 != 0,
                    spindle_dir_as_enable: bits & 2 != 0,
                    mist_coolant: bits & 4 != 0,
                    safety_door_shares_feed_hold: bits & 8 != 0,
                };
                let set = resolve(variant, flags, &Overrides::default()).unwrap();
                validate(&set).unwrap();
            }
        }
    }

    #[test]
    fn test_overlapping_defaults_rejected() {
        // Probe moved onto the coolant flood pin: same port, same bit.
        let table = patched_table(
            LogicalSignal::Probe,
            Some(pin(PortGroup::C, 3, "Uno Analog Pin 3")),
        );
        let set = resolve_table(
            BoardVariant::Compact,
            &table,
            FeatureFlags::default(),
            &Overrides::default(),
        )
        .unwrap();
        let err = validate(&set).unwrap_err();
        assert!(matches!(err, BindingError::InconsistentBinding { .. }));
    }

    #[test]
    fn test_input_on_limit_port_rejected() {
        let table = patched_table(
            LogicalSignal::Probe,
            Some(pin(PortGroup::B, 5, "Uno Digital Pin 13")),
        );
        let set = resolve_table(
            BoardVariant::Compact,
            &table,
            FeatureFlags::default(),
            &Overrides::default(),
        )
        .unwrap();
        let err = validate(&set).unwrap_err();
        match err {
            BindingError::InconsistentBinding { group, .. } => assert_eq!(group, "Limit"),
            other => panic!("expected limit-port violation, got {:?}", other),
        }
    }

    #[test]
    fn test_split_step_group_rejected() {
        let table = patched_table(
            LogicalSignal::ZStep,
            Some(pin(PortGroup::C, 6, "stray pin")),
        );
        let set = resolve_table(
            BoardVariant::Compact,
            &table,
            FeatureFlags::default(),
            &Overrides::default(),
        )
        .unwrap();
        let err = validate(&set).unwrap_err();
        match err {
            BindingError::InconsistentBinding { group, .. } => assert_eq!(group, "Step"),
            other => panic!("expected split group, got {:?}", other),
        }
    }
}
