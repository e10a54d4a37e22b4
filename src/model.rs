use serde::{Deserialize, Serialize};

/// The closed set of operation categories the analyzer counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Assignment,
    Comparison,
    ArrayAccess,
    FunctionCall,
    MemoryAllocation,
    ConditionalBranch,
    IoOperation,
    NetworkOperation,
}

impl OpKind {
    pub const COUNT: usize = 12;

    pub fn all() -> &'static [OpKind; Self::COUNT] {
        &[
            OpKind::Addition,
            OpKind::Subtraction,
            OpKind::Multiplication,
            OpKind::Division,
            OpKind::Assignment,
            OpKind::Comparison,
            OpKind::ArrayAccess,
            OpKind::FunctionCall,
            OpKind::MemoryAllocation,
            OpKind::ConditionalBranch,
            OpKind::IoOperation,
            OpKind::NetworkOperation,
        ]
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Canonical name used in the serialized output schema.
    pub fn name(self) -> &'static str {
        match self {
            OpKind::Addition => "addition",
            OpKind::Subtraction => "subtraction",
            OpKind::Multiplication => "multiplication",
            OpKind::Division => "division",
            OpKind::Assignment => "assignment",
            OpKind::Comparison => "comparison",
            OpKind::ArrayAccess => "array_access",
            OpKind::FunctionCall => "function_call",
            OpKind::MemoryAllocation => "memory_allocation",
            OpKind::ConditionalBranch => "conditional_branch",
            OpKind::IoOperation => "io_operation",
            OpKind::NetworkOperation => "network_operation",
        }
    }

    /// Relative energy cost of one operation of this kind.
    pub fn weight(self) -> u64 {
        match self {
            OpKind::Addition => 1,
            OpKind::Subtraction => 1,
            OpKind::Multiplication => 2,
            OpKind::Division => 3,
            OpKind::Assignment => 1,
            OpKind::Comparison => 1,
            OpKind::ArrayAccess => 2,
            OpKind::FunctionCall => 5,
            OpKind::MemoryAllocation => 10,
            OpKind::ConditionalBranch => 1,
            OpKind::IoOperation => 50,
            OpKind::NetworkOperation => 100,
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Energy model constants
// ---------------------------------------------------------------------------

/// Joules per weighted operation.
pub const ENERGY_PER_OP_JOULES: f64 = 3e-9;
/// Joules in one kilowatt-hour.
pub const JOULES_PER_KWH: f64 = 3_600_000.0;
/// Global-average carbon intensity, grams CO2 per kWh.
pub const CARBON_G_PER_KWH: f64 = 475.0;

/// Iteration count assumed when a loop bound cannot be resolved statically.
pub const DEFAULT_LOOP_ITERATIONS: u64 = 100;
/// Call-depth factor applied to the counters of a recursive function.
pub const DEFAULT_RECURSION_DEPTH: u64 = 10;

/// Daily executions assumed on an end-user device.
pub const ASSUMED_DAILY_USER_EXECUTIONS: f64 = 1_000.0;
/// Daily requests assumed against a server deployment.
pub const ASSUMED_DAILY_SERVER_REQUESTS: f64 = 10_000.0;
/// Datacenter power-usage-effectiveness overhead.
pub const SERVER_PUE: f64 = 1.58;
/// Joules of network transfer energy per server request.
pub const NETWORK_ENERGY_PER_REQUEST_J: f64 = 0.001;
/// Whole-device power overhead relative to CPU-only draw.
pub const DEVICE_POWER_OVERHEAD: f64 = 1.2;
/// Edit/compile/test amplification in a development environment.
pub const DEV_ENVIRONMENT_MULTIPLIER: f64 = 5.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_kinds() {
        assert_eq!(OpKind::all().len(), OpKind::COUNT);
    }

    #[test]
    fn indices_are_dense_and_ordered() {
        for (i, kind) in OpKind::all().iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn weights_match_model() {
        assert_eq!(OpKind::Addition.weight(), 1);
        assert_eq!(OpKind::Multiplication.weight(), 2);
        assert_eq!(OpKind::Division.weight(), 3);
        assert_eq!(OpKind::ArrayAccess.weight(), 2);
        assert_eq!(OpKind::FunctionCall.weight(), 5);
        assert_eq!(OpKind::MemoryAllocation.weight(), 10);
        assert_eq!(OpKind::IoOperation.weight(), 50);
        assert_eq!(OpKind::NetworkOperation.weight(), 100);
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(OpKind::IoOperation.name(), "io_operation");
        assert_eq!(OpKind::ConditionalBranch.name(), "conditional_branch");
        assert_eq!(OpKind::ArrayAccess.to_string(), "array_access");
    }
}
