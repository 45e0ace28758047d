use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOp {
    Open,
    Close,
    MoveAbsolute(i32),
    MoveRelative(i32),
    WaitForStop,
    Stop,
    Home,
    Zero,
    GetPosition,
    GetSpeed,
    SetSpeed(u32),
    GetStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Open,
    Close,
    MoveAbsolute,
    MoveRelative,
    WaitForStop,
    Stop,
    Home,
    Zero,
    GetPosition,
    GetSpeed,
    SetSpeed,
    GetStatus,
}

impl AxisOp {
    pub fn kind(&self) -> OpKind {
        match self {
            AxisOp::Open => OpKind::Open,
            AxisOp::Close => OpKind::Close,
            AxisOp::MoveAbsolute(_) => OpKind::MoveAbsolute,
            AxisOp::MoveRelative(_) => OpKind::MoveRelative,
            AxisOp::WaitForStop => OpKind::WaitForStop,
            AxisOp::Stop => OpKind::Stop,
            AxisOp::Home => OpKind::Home,
            AxisOp::Zero => OpKind::Zero,
            AxisOp::GetPosition => OpKind::GetPosition,
            AxisOp::GetSpeed => OpKind::GetSpeed,
            AxisOp::SetSpeed(_) => OpKind::SetSpeed,
            AxisOp::GetStatus => OpKind::GetStatus,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisCall {
    pub axis: String,
    pub op: AxisOp,
}

/// Ordered record of every call issued to a set of simulated axes.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<AxisCall>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, axis: &str, op: AxisOp) {
        self.lock().push(AxisCall {
            axis: axis.to_string(),
            op,
        });
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn position(&self, axis: &str, op: AxisOp) -> Option<usize> {
        self.lock()
            .iter()
            .position(|call| call.axis == axis && call.op == op)
    }

    pub fn last_of(&self, axis: &str, kind: OpKind) -> Option<usize> {
        self.lock()
            .iter()
            .rposition(|call| call.axis == axis && call.op.kind() == kind)
    }

    pub fn count(&self, axis: &str, kind: OpKind) -> usize {
        self.lock()
            .iter()
            .filter(|call| call.axis == axis && call.op.kind() == kind)
            .count()
    }

    /// Calls excluding position, speed and status reads.
    pub fn commands(&self) -> Vec<AxisCall> {
        self.lock()
            .iter()
            .filter(|call| {
                !matches!(
                    call.op.kind(),
                    OpKind::GetPosition | OpKind::GetSpeed | OpKind::GetStatus
                )
            })
            .cloned()
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AxisCall>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
