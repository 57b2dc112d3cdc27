pub mod llm;
pub mod normalize;
pub mod prompts;
