use smartcrop_core::api::{AdvisorClient, QUICK_PROMPTS};

use crate::commands::common::{join_question, AppContext};
use crate::error::CliError;

pub async fn run_ask(
    context: &AppContext,
    question: &[String],
    prompt: Option<usize>,
    list_prompts: bool,
) -> Result<(), CliError> {
    if list_prompts {
        for (index, prompt) in QUICK_PROMPTS.iter().enumerate() {
            println!("{}. {prompt}", index + 1);
        }
        return Ok(());
    }

    let question = match prompt {
        Some(number) => quick_prompt(number)?.to_string(),
        None => join_question(question),
    };
    let advisor = AdvisorClient::new(&context.config.api_base_url)?;
    println!("{}", advisor.ask(&question).await);
    Ok(())
}

pub fn quick_prompt(number: usize) -> Result<&'static str, CliError> {
    number
        .checked_sub(1)
        .and_then(|index| QUICK_PROMPTS.get(index))
        .copied()
        .ok_or(CliError::UnknownPrompt(number, QUICK_PROMPTS.len()))
}
