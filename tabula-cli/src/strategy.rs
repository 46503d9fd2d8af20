//! Prompt strategy selection by name.

use std::sync::Arc;

use tabula_core::prompt::{
    ChainOfThoughtPrompt, CodePrompt, EngineeredPrompt, FewShotPrompt, PromptStrategy,
    ZeroShotPrompt,
};

pub const STRATEGY_NAMES: [&str; 5] =
    ["code", "zero-shot", "few-shot", "chain-of-thought", "engineered"];

pub fn by_name(name: &str) -> Option<Arc<dyn PromptStrategy>> {
    match name {
        "code" => Some(Arc::new(CodePrompt)),
        "zero-shot" => Some(Arc::new(ZeroShotPrompt)),
        "few-shot" => Some(Arc::new(FewShotPrompt)),
        "chain-of-thought" => Some(Arc::new(ChainOfThoughtPrompt)),
        "engineered" => Some(Arc::new(EngineeredPrompt)),
        _ => None,
    }
}
