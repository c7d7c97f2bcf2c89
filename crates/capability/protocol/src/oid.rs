//! OID（对象标识符）
//!
//! 文本形式兼容带前导点（`.1.3.6.1...`）与不带前导点两种写法，`Display` 统一输出带前导点形式。

use crate::error::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// SNMP 对象标识符
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(Vec<u32>);

impl Oid {
    /// 由分量构造（至少两段）
    pub fn from_arcs(arcs: Vec<u32>) -> Result<Self, ProtocolError> {
        if arcs.len() < 2 {
            return Err(ProtocolError::ConfigParse(format!(
                "oid needs at least two arcs: {:?}",
                arcs
            )));
        }
        if arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
            return Err(ProtocolError::ConfigParse(format!(
                "invalid leading arcs: {}.{}",
                arcs[0], arcs[1]
            )));
        }
        Ok(Self(arcs))
    }

    /// 由内置常量构造，不做校验
    pub fn from_static(arcs: &'static [u32]) -> Self {
        Self(arcs.to_vec())
    }

    /// 在当前 OID 后追加若干分量，得到子节点
    pub fn child(&self, arcs: &[u32]) -> Self {
        let mut next = self.0.clone();
        next.extend_from_slice(arcs);
        Self(next)
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl FromStr for Oid {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(ProtocolError::ConfigParse("empty oid".to_string()));
        }
        let arcs = trimmed
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| ProtocolError::ConfigParse(format!("invalid oid arc '{}' in {}", part, s)))
            })
            .collect::<Result<Vec<u32>, _>>()?;
        Self::from_arcs(arcs)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for arc in &self.0 {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}
