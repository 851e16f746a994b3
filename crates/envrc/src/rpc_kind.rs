use std::fmt;

/// The kind of L1 RPC provider, as understood by op-node's `--l1.rpckind`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RpcKind {
    #[default]
    Alchemy,
    Quicknode,
    Infura,
    Parity,
    Nethermind,
    DebugGeth,
    Erigon,
    Basic,
    Any,
    Standard,
    #[strum(default)]
    Custom(String),
}

impl RpcKind {
    pub fn as_str(&self) -> &str {
        match self {
            RpcKind::Alchemy => "alchemy",
            RpcKind::Quicknode => "quicknode",
            RpcKind::Infura => "infura",
            RpcKind::Parity => "parity",
            RpcKind::Nethermind => "nethermind",
            RpcKind::DebugGeth => "debug_geth",
            RpcKind::Erigon => "erigon",
            RpcKind::Basic => "basic",
            RpcKind::Any => "any",
            RpcKind::Standard => "standard",
            RpcKind::Custom(kind) => kind,
        }
    }

    /// Whether op-node knows this kind out of the box.
    pub fn is_known(&self) -> bool {
        !matches!(self, RpcKind::Custom(_))
    }
}

impl fmt::Display for RpcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
