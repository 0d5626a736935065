//! 提交状态机
//!
//! 管理一次表单提交从校验到结果展示的状态转换

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use stroke_core::{Result, StrokeError};

/// 提交状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    Idle,             // 可编辑
    Validating,       // 校验中
    ValidationFailed, // 校验未通过
    Submitting,       // 请求进行中
    Success,          // 已获得结果
    Failure,          // 请求失败
}

/// 状态转换事件
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SubmissionEvent {
    Submit,
    ValidationPassed,
    ValidationRejected,
    ResponseReceived,
    RequestFailed,
    Settle,
    Edit,
}

/// 提交状态机
#[derive(Debug)]
pub struct SubmissionStateMachine {
    transitions: HashMap<(SubmissionState, SubmissionEvent), SubmissionState>,
}

impl SubmissionStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        use SubmissionEvent as E;
        use SubmissionState as S;

        let mut transitions = HashMap::new();

        transitions.insert((S::Idle, E::Submit), S::Validating);
        transitions.insert((S::Success, E::Submit), S::Validating);
        transitions.insert((S::Validating, E::ValidationRejected), S::ValidationFailed);
        transitions.insert((S::Validating, E::ValidationPassed), S::Submitting);
        transitions.insert((S::Submitting, E::ResponseReceived), S::Success);
        transitions.insert((S::Submitting, E::RequestFailed), S::Failure);
        transitions.insert((S::ValidationFailed, E::Settle), S::Idle);
        transitions.insert((S::Failure, E::Settle), S::Idle);

        for state in [S::Idle, S::Success, S::ValidationFailed, S::Failure] {
            transitions.insert((state, E::Edit), S::Idle);
        }

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: &SubmissionState, event: &SubmissionEvent) -> bool {
        self.transitions.contains_key(&(*from, *event))
    }

    /// 执行状态转换
    pub fn transition(&self, from: &SubmissionState, event: &SubmissionEvent) -> Result<SubmissionState> {
        match self.transitions.get(&(*from, *event)) {
            Some(to) => Ok(*to),
            None => Err(StrokeError::InvalidStateTransition {
                from: format!("{:?}", from),
                event: format!("{:?}", event),
            }),
        }
    }

    /// 获取状态的所有可能事件
    pub fn get_possible_events(&self, current_state: &SubmissionState) -> Vec<SubmissionEvent> {
        self.transitions
            .keys()
            .filter(|(state, _)| state == current_state)
            .map(|(_, event)| *event)
            .collect()
    }
}

impl Default for SubmissionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let sm = SubmissionStateMachine::new();

        assert!(sm.can_transition(&SubmissionState::Idle, &SubmissionEvent::Submit));
        assert!(sm.can_transition(&SubmissionState::Validating, &SubmissionEvent::ValidationPassed));
        assert!(sm.can_transition(&SubmissionState::Submitting, &SubmissionEvent::RequestFailed));
        assert!(sm.can_transition(&SubmissionState::Failure, &SubmissionEvent::Settle));
        assert!(sm.can_transition(&SubmissionState::Success, &SubmissionEvent::Edit));
    }

    #[test]
    fn test_no_submit_while_in_flight() {
        let sm = SubmissionStateMachine::new();

        assert!(!sm.can_transition(&SubmissionState::Submitting, &SubmissionEvent::Submit));
        assert!(!sm.can_transition(&SubmissionState::Validating, &SubmissionEvent::Submit));
        assert!(!sm.can_transition(&SubmissionState::Submitting, &SubmissionEvent::Edit));
    }

    #[test]
    fn test_state_execution() {
        let sm = SubmissionStateMachine::new();

        let mut state = SubmissionState::Idle;
        for event in [
            SubmissionEvent::Submit,
            SubmissionEvent::ValidationPassed,
            SubmissionEvent::RequestFailed,
            SubmissionEvent::Settle,
        ] {
            state = sm.transition(&state, &event).unwrap();
        }
        assert_eq!(state, SubmissionState::Idle);

        let result = sm.transition(&SubmissionState::Idle, &SubmissionEvent::ResponseReceived);
        assert!(matches!(result, Err(StrokeError::InvalidStateTransition { .. })));
    }

    #[test]
    fn test_possible_events() {
        let sm = SubmissionStateMachine::new();

        let mut events = sm.get_possible_events(&SubmissionState::Validating);
        events.sort_by_key(|e| format!("{:?}", e));
        assert_eq!(
            events,
            vec![SubmissionEvent::ValidationPassed, SubmissionEvent::ValidationRejected]
        );
    }
}
