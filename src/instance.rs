//! Per-agent instance data for renderers.
//!
//! The renderer owns buffers and draw calls; this module only lays out
//! what it reads for each agent so the slice can be uploaded as-is.

use crate::agent::Agent;
use bytemuck::{Pod, Zeroable};

/// One agent as an instanced-draw record.
///
/// 80 bytes: a column-major model matrix followed by the agent's phase
/// offset and group, padded to a 16-byte multiple.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct AgentInstance {
    /// `translation(position) * rotation(orientation)`, column-major.
    pub model: [[f32; 4]; 4],
    /// Phase offset for animation and hue variation.
    pub phase: f32,
    /// Flock id.
    pub group: u32,
    /// Keeps the record a 16-byte multiple; always zero.
    _pad: [u32; 2],
}

impl From<&Agent> for AgentInstance {
    fn from(agent: &Agent) -> Self {
        Self {
            model: agent.model_matrix().to_cols_array_2d(),
            phase: agent.phase(),
            group: agent.group(),
            _pad: [0; 2],
        }
    }
}

/// Refill `out` with one instance per agent.
pub fn write_instances(agents: &[Agent], out: &mut Vec<AgentInstance>) {
    out.clear();
    out.extend(agents.iter().map(AgentInstance::from));
}

/// Raw bytes of an instance slice, ready for a vertex buffer upload.
pub fn as_bytes(instances: &[AgentInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
