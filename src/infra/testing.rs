//! 测试用脚本化执行器
//!
//! 按前缀匹配命令并返回预设结果，同时记录所有调用

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;

use super::command::{CommandError, CommandExecutor, Invocation};
use crate::domain::CommandOutcome;

type Effect = Box<dyn Fn(&Invocation) + Send + Sync>;

enum Response {
    Outcome(CommandOutcome),
    NotFound,
}

impl Response {
    fn materialize(&self) -> Result<CommandOutcome, CommandError> {
        match self {
            Response::Outcome(o) => Ok(o.clone()),
            Response::NotFound => Err(CommandError::SpawnFailed(io::Error::new(
                io::ErrorKind::NotFound,
                "No such file or directory",
            ))),
        }
    }
}

struct Rule {
    prefix: Vec<String>,
    /// 按顺序消费，最后一个重复使用
    responses: VecDeque<Response>,
    effect: Option<Effect>,
}

impl Rule {
    fn matches(&self, argv: &[&str]) -> bool {
        argv.len() >= self.prefix.len() && self.prefix.iter().zip(argv).all(|(p, a)| p == a)
    }

    fn next(&mut self) -> Result<CommandOutcome, CommandError> {
        let response = if self.responses.len() > 1 {
            self.responses.pop_front()
        } else {
            None
        };
        match response {
            Some(r) => r.materialize(),
            None => self
                .responses
                .front()
                .map(Response::materialize)
                .unwrap_or_else(|| Ok(CommandOutcome::ok(""))),
        }
    }
}

/// 未匹配任何规则的命令默认成功且无输出
#[derive(Default)]
pub struct ScriptedExecutor {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, prefix: &[&str], responses: Vec<Response>, effect: Option<Effect>) {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            responses: responses.into(),
            effect,
        });
    }

    /// 匹配前缀的命令总是返回 `outcome`
    pub fn on(&self, prefix: &[&str], outcome: CommandOutcome) {
        self.push(prefix, vec![Response::Outcome(outcome)], None);
    }

    /// 依次返回 `outcomes`，用完后重复最后一个
    pub fn on_sequence(&self, prefix: &[&str], outcomes: Vec<CommandOutcome>) {
        self.push(
            prefix,
            outcomes.into_iter().map(Response::Outcome).collect(),
            None,
        );
    }

    /// 模拟程序不存在
    pub fn on_missing(&self, prefix: &[&str]) {
        self.push(prefix, vec![Response::NotFound], None);
    }

    /// 成功并执行副作用（如创建克隆目录）
    pub fn on_effect<F>(&self, prefix: &[&str], effect: F)
    where
        F: Fn(&Invocation) + Send + Sync + 'static,
    {
        self.push(
            prefix,
            vec![Response::Outcome(CommandOutcome::ok(""))],
            Some(Box::new(effect)),
        );
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// 所有调用的命令行文本
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }

    /// 以 `prefix` 开头的调用次数
    pub fn count(&self, prefix: &str) -> usize {
        self.commands().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome, CommandError> {
        self.calls.lock().unwrap().push(invocation.clone());

        let argv = invocation.argv();
        let mut rules = self.rules.lock().unwrap();
        match rules.iter_mut().find(|r| r.matches(&argv)) {
            Some(rule) => {
                if let Some(effect) = &rule.effect {
                    effect(invocation);
                }
                rule.next()
            }
            None => Ok(CommandOutcome::ok("")),
        }
    }
}
