use std::fmt;

/// 读数缺失时使用的默认电压。
pub const DEFAULT_VOLTAGE: f64 = 120.0;
/// 读数缺失时使用的默认电流。
pub const DEFAULT_CURRENT: f64 = 0.0;

/// 插座编号（1..=N）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutletId(u32);

/// 插座编号校验错误（调用方错误，不涉及设备 I/O）。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutletIdError {
    #[error("outlet id is not a number: {0}")]
    NotNumeric(String),
    #[error("outlet id {value} out of range 1..={max}")]
    OutOfRange { value: i64, max: u32 },
}

impl OutletId {
    /// 构造编号，0 非法。
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    /// 解析外部传入的字符串编号并校验 `[1, outlet_count]`。
    pub fn parse(raw: &str, outlet_count: u32) -> Result<Self, OutletIdError> {
        let trimmed = raw.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| OutletIdError::NotNumeric(trimmed.to_string()))?;
        if value < 1 || value > i64::from(outlet_count) {
            return Err(OutletIdError::OutOfRange {
                value,
                max: outlet_count,
            });
        }
        Ok(Self(value as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// 展示名称："Outlet {id}"。
    pub fn display_name(self) -> String {
        format!("Outlet {}", self.0)
    }
}

impl fmt::Display for OutletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 插座逻辑状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutletState {
    On,
    Off,
    Unknown,
}

impl OutletState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OutletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 写入意图（cycle 由设备原生执行"先断后通"）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    On,
    Off,
    Cycle,
}

impl TargetState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Cycle => "cycle",
        }
    }

    /// toggle 的目标：当前为 on 则 off，其余（含 unknown）一律 on。
    pub fn toggled_from(current: OutletState) -> Self {
        match current {
            OutletState::On => Self::Off,
            OutletState::Off | OutletState::Unknown => Self::On,
        }
    }
}

/// 单次读取得到的插座观测值，构造后不再修改。
#[derive(Debug, Clone, PartialEq)]
pub struct OutletReading {
    pub id: OutletId,
    pub name: String,
    pub state: OutletState,
    pub voltage: f64,
    pub current: f64,
    pub observed_at_ms: i64,
    pub error: Option<String>,
}

/// 单插座读取结果：正常或降级（降级读数必带 error）。
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Ok(OutletReading),
    Degraded(OutletReading),
}

impl ReadOutcome {
    pub fn reading(&self) -> &OutletReading {
        match self {
            Self::Ok(reading) | Self::Degraded(reading) => reading,
        }
    }

    pub fn into_reading(self) -> OutletReading {
        match self {
            Self::Ok(reading) | Self::Degraded(reading) => reading,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// 全量读取结果。`degraded` 为 true 时 `outlets` 是占位数据而非设备读数。
#[derive(Debug, Clone, PartialEq)]
pub struct OutletList {
    pub outlets: Vec<OutletReading>,
    pub degraded: bool,
}

/// toggle / cycle 的终态结果，每次操作恰好产生一个。
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// 写入成功并完成回读。
    Completed {
        reading: OutletReading,
        message: String,
    },
    /// 写入失败；toggle 保留操作前状态，cycle 为 unknown。
    Failed {
        id: OutletId,
        name: String,
        state: OutletState,
        message: String,
        error: String,
    },
}

impl OperationOutcome {
    pub fn id(&self) -> OutletId {
        match self {
            Self::Completed { reading, .. } => reading.id,
            Self::Failed { id, .. } => *id,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Completed { message, .. } | Self::Failed { message, .. } => message,
        }
    }

    /// 结果中的错误说明（回读降级时也会带上读数的 error）。
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed { reading, .. } => reading.error.as_deref(),
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn state(&self) -> OutletState {
        match self {
            Self::Completed { reading, .. } => reading.state,
            Self::Failed { state, .. } => *state,
        }
    }
}
