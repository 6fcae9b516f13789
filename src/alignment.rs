pub mod builder;
pub mod tokenizer;
