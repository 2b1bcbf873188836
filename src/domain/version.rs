use crate::domain::{ChangeLevel, PrereleaseSuffix};
use crate::error::{ReleaseError, Result};
use semver::{BuildMetadata, Version};
use std::cmp::Ordering;

/// Parse a semantic version, accepting an optional leading `v`/`V`
pub fn parse_version(s: &str) -> Result<Version> {
    let clean = s.trim().trim_start_matches('v').trim_start_matches('V');
    Version::parse(clean)
        .map_err(|e| ReleaseError::version(format!("invalid semantic version '{}': {}", s, e)))
}

/// Whether the version carries a pre-release suffix
pub fn is_prerelease(version: &Version) -> bool {
    !version.pre.is_empty()
}

/// Drop pre-release and build metadata, keeping the numeric parts
pub fn stabilize(version: &Version) -> Version {
    Version::new(version.major, version.minor, version.patch)
}

/// Compare by semver precedence, ignoring build metadata
pub fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    let strip = |v: &Version| Version {
        build: BuildMetadata::EMPTY,
        ..v.clone()
    };
    strip(a).cmp(&strip(b))
}

/// Standard semver bump of the numeric parts.
///
/// Lower components reset to zero; `None` leaves the numbers unchanged. The
/// result never carries a pre-release or build suffix. Fails when the bumped
/// component would overflow.
pub fn increment(version: &Version, level: ChangeLevel) -> Result<Version> {
    let bump = |n: u64| {
        n.checked_add(1).ok_or_else(|| {
            ReleaseError::version(format!(
                "cannot apply a {} change to {}: version component overflows",
                level, version
            ))
        })
    };

    let mut next = stabilize(version);
    match level {
        ChangeLevel::Major => {
            next.major = bump(next.major)?;
            next.minor = 0;
            next.patch = 0;
        }
        ChangeLevel::Minor => {
            next.minor = bump(next.minor)?;
            next.patch = 0;
        }
        ChangeLevel::Patch => {
            next.patch = bump(next.patch)?;
        }
        ChangeLevel::None => {}
    }
    Ok(next)
}

/// Next pre-release after `version` for a change of `level`.
///
/// - stable input: bump by `level`, then start the track (`<prefix>.0` or `0`)
/// - same track (or no prefix requested): bump the trailing iteration
/// - a different track: start it on the stabilized version, bumped only for
///   minor and major changes
///
/// The result is not checked against `version`; callers must verify that it
/// sorts higher.
pub fn increment_prerelease(version: &Version, level: ChangeLevel, prefix: &str) -> Result<Version> {
    if level == ChangeLevel::None {
        return Err(ReleaseError::label(
            "invalid change level for pre-release: none",
        ));
    }

    if !is_prerelease(version) {
        let mut next = increment(version, level)?;
        next.pre = PrereleaseSuffix::start(prefix).to_prerelease()?;
        return Ok(next);
    }

    let current = PrereleaseSuffix::parse(version.pre.as_str());
    if prefix.is_empty() || current.is_track(prefix) {
        let mut next = stabilize(version);
        next.pre = current.increment_iteration()?.to_prerelease()?;
        return Ok(next);
    }

    let mut next = if level >= ChangeLevel::Minor {
        increment(version, level)?
    } else {
        stabilize(version)
    };
    next.pre = PrereleaseSuffix::start(prefix).to_prerelease()?;
    Ok(next)
}
