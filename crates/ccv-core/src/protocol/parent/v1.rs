use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    protocol::{
        child::v1::UnbondingSequence,
        client::v1::{
            sdk_proof_specs,
            sdk_upgrade_path,
            ProofSpec,
            TrustLevel,
        },
    },
    serde::duration_nanos,
};

const DEFAULT_UNBONDING_PERIOD: Duration = Duration::from_secs(21 * 24 * 60 * 60);
const DEFAULT_TRUSTING_PERIOD: Duration = Duration::from_secs(21 * 24 * 60 * 60 / 2);
const DEFAULT_MAX_CLOCK_DRIFT: Duration = Duration::from_secs(10);

/// The parameters with which the parent builds light clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustParams {
    pub trust_level: TrustLevel,
    #[serde(with = "duration_nanos")]
    pub trusting_period: Duration,
    #[serde(with = "duration_nanos")]
    pub unbonding_period: Duration,
    #[serde(with = "duration_nanos")]
    pub max_clock_drift: Duration,
    pub proof_specs: Vec<ProofSpec>,
    pub upgrade_path: Vec<String>,
    pub allow_update_after_expiry: bool,
    pub allow_update_after_misbehaviour: bool,
}

impl TrustParams {
    /// Checks that light clients built from these parameters are usable.
    ///
    /// # Errors
    /// Returns an error if the trust level is outside `[1/3, 1]`, if any period is
    /// zero, if the trusting period is not shorter than the unbonding period, or if
    /// there are no proof specs or empty upgrade path segments.
    pub fn validate(&self) -> Result<(), TrustParamsError> {
        if !self.trust_level.is_valid() {
            return Err(TrustParamsError::trust_level(self.trust_level));
        }
        if self.trusting_period.is_zero() {
            return Err(TrustParamsError::zero_period("trusting_period"));
        }
        if self.unbonding_period.is_zero() {
            return Err(TrustParamsError::zero_period("unbonding_period"));
        }
        if self.max_clock_drift.is_zero() {
            return Err(TrustParamsError::zero_period("max_clock_drift"));
        }
        if self.trusting_period >= self.unbonding_period {
            return Err(TrustParamsError::trusting_not_below_unbonding(
                self.trusting_period,
                self.unbonding_period,
            ));
        }
        if self.proof_specs.is_empty() {
            return Err(TrustParamsError::no_proof_specs());
        }
        if let Some(index) = self.upgrade_path.iter().position(String::is_empty) {
            return Err(TrustParamsError::empty_upgrade_path_segment(index));
        }
        Ok(())
    }
}

impl Default for TrustParams {
    fn default() -> Self {
        Self {
            trust_level: TrustLevel::ONE_THIRD,
            trusting_period: DEFAULT_TRUSTING_PERIOD,
            unbonding_period: DEFAULT_UNBONDING_PERIOD,
            max_clock_drift: DEFAULT_MAX_CLOCK_DRIFT,
            proof_specs: sdk_proof_specs(),
            upgrade_path: sdk_upgrade_path(),
            allow_update_after_expiry: true,
            allow_update_after_misbehaviour: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct TrustParamsError(TrustParamsErrorKind);

impl TrustParamsError {
    fn trust_level(level: TrustLevel) -> Self {
        Self(TrustParamsErrorKind::TrustLevel {
            numerator: level.numerator,
            denominator: level.denominator,
        })
    }

    fn zero_period(name: &'static str) -> Self {
        Self(TrustParamsErrorKind::ZeroPeriod {
            name,
        })
    }

    fn trusting_not_below_unbonding(trusting: Duration, unbonding: Duration) -> Self {
        Self(TrustParamsErrorKind::TrustingNotBelowUnbonding {
            trusting,
            unbonding,
        })
    }

    fn no_proof_specs() -> Self {
        Self(TrustParamsErrorKind::NoProofSpecs)
    }

    fn empty_upgrade_path_segment(index: usize) -> Self {
        Self(TrustParamsErrorKind::EmptyUpgradePathSegment {
            index,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum TrustParamsErrorKind {
    #[error("trust level `{numerator}/{denominator}` is not within [1/3, 1]")]
    TrustLevel { numerator: u64, denominator: u64 },
    #[error("`{name}` must not be zero")]
    ZeroPeriod { name: &'static str },
    #[error(
        "trusting period `{trusting:?}` must be shorter than the unbonding period `{unbonding:?}`"
    )]
    TrustingNotBelowUnbonding {
        trusting: Duration,
        unbonding: Duration,
    },
    #[error("at least one proof spec must be provided")]
    NoProofSpecs,
    #[error("upgrade path segment at index `{index}` is empty")]
    EmptyUpgradePathSegment { index: usize },
}

/// The parameters of the parent chain's CCV module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Forwarded to the parameters of every spawned child.
    pub enabled: bool,
    pub trust: TrustParams,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            enabled: true,
            trust: TrustParams::default(),
        }
    }
}

/// The parent module's section of the host chain's genesis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisAppState {
    pub params: Params,
    pub unbonding_sequences: Vec<UnbondingSequence>,
}
