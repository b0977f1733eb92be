//! Resource set validation

use tracing::trace;

use super::spec::{ArgsMatcher, CallSpec, MountMode, MountSpec, ResourceSpec};
use super::{Call, Mount, ResourceSet};
use crate::error::{EnclaveError, EnclaveResult, ResourceLabel};

/// Validate a raw resource set and build its normalized form.
///
/// Mount modes are canonicalized to `ro`/`rw`, calls must carry a name and a
/// command, and `allowed-args` patterns are compiled here so a bad pattern is
/// rejected at load time rather than when the call is used.
pub fn normalize(
    set: &ResourceSet,
    label: impl Into<ResourceLabel>,
) -> EnclaveResult<ResourceSpec> {
    let label = label.into();

    let mounts = set
        .mounts
        .iter()
        .enumerate()
        .map(|(index, mount)| normalize_mount(&label, index, mount))
        .collect::<EnclaveResult<Vec<_>>>()?;

    let calls = set
        .calls
        .iter()
        .enumerate()
        .map(|(index, call)| normalize_call(&label, index, call))
        .collect::<EnclaveResult<Vec<_>>>()?;

    trace!(
        label = label.as_str(),
        mounts = mounts.len(),
        calls = calls.len(),
        "normalized resource set"
    );

    Ok(ResourceSpec::from_parts(set, mounts, calls))
}

/// Normalize an optional set. An absent set is not an error.
pub fn normalize_optional(
    set: Option<&ResourceSet>,
    label: impl Into<ResourceLabel>,
) -> EnclaveResult<Option<ResourceSpec>> {
    set.map(|set| normalize(set, label)).transpose()
}

fn normalize_mount(label: &ResourceLabel, index: usize, mount: &Mount) -> EnclaveResult<MountSpec> {
    let mode = MountMode::parse(&mount.mode).ok_or_else(|| EnclaveError::InvalidMountMode {
        label: label.clone(),
        index,
        mode: mount.mode.clone(),
    })?;

    Ok(MountSpec {
        source: mount.source.clone(),
        target: mount.target.clone(),
        mode,
    })
}

fn normalize_call(label: &ResourceLabel, index: usize, call: &Call) -> EnclaveResult<CallSpec> {
    if call.name.trim().is_empty() {
        return Err(EnclaveError::MissingCallName {
            label: label.clone(),
            index,
        });
    }
    if call.command.trim().is_empty() {
        return Err(EnclaveError::MissingCallCommand {
            label: label.clone(),
            index,
        });
    }

    let allowed_args = if call.allowed_args.is_empty() {
        None
    } else {
        let matcher = ArgsMatcher::new(&call.allowed_args).map_err(|e| {
            EnclaveError::InvalidAllowedArgsPattern {
                label: label.clone(),
                call: call.name.clone(),
                message: e.to_string(),
            }
        })?;
        Some(matcher)
    };

    Ok(CallSpec::new(
        call.name.clone(),
        call.description.clone(),
        call.command.clone(),
        allowed_args,
    ))
}
