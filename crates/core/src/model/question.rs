use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of questions in the fixed bank.
pub const QUESTION_COUNT: usize = 10;

/// Every question offers exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("a question needs exactly {OPTIONS_PER_QUESTION} options, got {0}")]
    WrongOptionCount(usize),

    #[error("answer {answer:?} is not one of the options")]
    AnswerNotAnOption { answer: String },
}

/// A single multiple-choice question. Read-only at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    answer: String,
}

impl Question {
    /// Build a question, checking that the answer is one of the options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::WrongOptionCount` or
    /// `QuestionError::AnswerNotAnOption` when the invariants do not hold.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let answer = answer.into();
        if options.len() != OPTIONS_PER_QUESTION {
            return Err(QuestionError::WrongOptionCount(options.len()));
        }
        if !options.iter().any(|o| o == &answer) {
            return Err(QuestionError::AnswerNotAnOption { answer });
        }

        Ok(Self {
            prompt: prompt.into(),
            options,
            answer,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Returns true when the selected option matches this question's answer.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        self.answer == selected
    }
}

const BANK: [(&str, [&str; OPTIONS_PER_QUESTION], &str); QUESTION_COUNT] = [
    (
        "What is a decentralized exchange (DEX)?",
        ["Uniswap", "Coinbase", "Binance", "Robinhood"],
        "Uniswap",
    ),
    (
        "What does DeFi stand for?",
        [
            "Decentralized Finance",
            "Digital Federation",
            "Dynamic Fees",
            "DeFi Network",
        ],
        "Decentralized Finance",
    ),
    (
        "Which blockchain is most associated with DeFi?",
        ["Bitcoin", "Ethereum", "Solana", "Ripple"],
        "Ethereum",
    ),
    (
        "What is the purpose of a smart contract?",
        [
            "Automate transactions",
            "Store private keys",
            "Manage hardware",
            "Issue tokens",
        ],
        "Automate transactions",
    ),
    (
        "What is yield farming?",
        [
            "Growing crops on-chain",
            "Earning rewards by staking liquidity",
            "Mining new coins",
            "Trading futures",
        ],
        "Earning rewards by staking liquidity",
    ),
    (
        "What is a DAO?",
        [
            "Digital Asset Operation",
            "Decentralized Autonomous Organization",
            "Direct Access Overlay",
            "Data Allocation Office",
        ],
        "Decentralized Autonomous Organization",
    ),
    (
        "What is the native token of Ethereum?",
        ["BTC", "ETH", "SOL", "BNB"],
        "ETH",
    ),
    (
        "Which of these is a stablecoin?",
        ["USDT", "ETH", "DOGE", "MATIC"],
        "USDT",
    ),
    (
        "What does 'staking' mean in crypto?",
        [
            "Holding tokens to support network security",
            "Mining new Bitcoin",
            "Swapping tokens",
            "Creating NFTs",
        ],
        "Holding tokens to support network security",
    ),
    (
        "Which protocol enables borrowing and lending in DeFi?",
        ["Aave", "Coinbase", "OpenSea", "Binance"],
        "Aave",
    ),
];

/// The fixed ten-question bank used by every quiz session.
///
/// # Panics
///
/// Panics if a bank entry does not list its answer among its options, which
/// is checked by tests.
#[must_use]
pub fn question_bank() -> Vec<Question> {
    BANK.iter()
        .map(|(prompt, options, answer)| {
            Question::new(
                *prompt,
                options.iter().map(|o| (*o).to_string()).collect(),
                *answer,
            )
            .expect("bank entries list their answer among the options")
        })
        .collect()
}
