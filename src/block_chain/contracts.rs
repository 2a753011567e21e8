//! Call and event descriptors for the LearNova contracts.
//!
//! Amounts are 18-decimal fixed point integers, dates are Unix seconds.

use ethers::prelude::*;

use crate::config::AppConfig;

/// Addresses of the three contracts the service talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractAddresses {
    /// ERC-20 reward token (LNT).
    pub quiz_token: Address,
    pub quiz_factory: Address,
    pub faucet: Address,
}

impl ContractAddresses {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            quiz_token: config.quiz_token,
            quiz_factory: config.quiz_factory,
            faucet: config.faucet,
        }
    }
}

// Reward token

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "balanceOf", abi = "balanceOf(address)")]
pub struct BalanceOfCall {
    pub owner: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "approve", abi = "approve(address,uint256)")]
pub struct ApproveCall {
    pub spender: Address,
    pub amount: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, EthEvent)]
#[ethevent(name = "Approval", abi = "Approval(address,address,uint256)")]
pub struct ApprovalEvent {
    #[ethevent(indexed)]
    pub owner: Address,
    #[ethevent(indexed)]
    pub spender: Address,
    pub value: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, EthEvent)]
#[ethevent(name = "Transfer", abi = "Transfer(address,address,uint256)")]
pub struct TransferEvent {
    #[ethevent(indexed)]
    pub from: Address,
    #[ethevent(indexed)]
    pub to: Address,
    pub value: U256,
}

// Quiz factory

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "createQuiz", abi = "createQuiz(string,uint256,uint256,uint256,uint256)")]
pub struct CreateQuizCall {
    pub name: String,
    pub token_reward: U256,
    pub taker_limit: U256,
    pub start_date: U256,
    pub end_date: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "attemptQuiz", abi = "attemptQuiz(uint256,bool)")]
pub struct AttemptQuizCall {
    pub quiz_id: U256,
    pub won: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "updateQuiz", abi = "updateQuiz(uint256,uint256,uint256,uint256,uint256)")]
pub struct UpdateQuizCall {
    pub quiz_id: U256,
    pub token_reward: U256,
    pub taker_limit: U256,
    pub start_date: U256,
    pub end_date: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "withdrawRemainingTokens", abi = "withdrawRemainingTokens(uint256)")]
pub struct WithdrawRemainingTokensCall {
    pub quiz_id: U256,
}

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "quizzes", abi = "quizzes(uint256)")]
pub struct QuizzesCall {
    pub quiz_id: U256,
}

/// Return tuple of the public `quizzes(uint256)` getter.
#[derive(Clone, Debug, Default, PartialEq, Eq, EthAbiType, EthAbiCodec)]
pub struct QuizzesReturn {
    pub owner: Address,
    pub name: String,
    pub token_reward: U256,
    pub total_tokens: U256,
    pub taker_limit: U256,
    pub taker_count: U256,
    pub winner_count: U256,
    pub start_date: U256,
    pub end_date: U256,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, EthEvent)]
#[ethevent(
    name = "QuizCreated",
    abi = "QuizCreated(uint256,address,string,uint256,uint256,uint256,uint256)"
)]
pub struct QuizCreatedEvent {
    #[ethevent(indexed)]
    pub quiz_id: U256,
    #[ethevent(indexed)]
    pub owner: Address,
    pub name: String,
    pub token_reward: U256,
    pub taker_limit: U256,
    pub start_date: U256,
    pub end_date: U256,
}

// Faucet

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "canClaim", abi = "canClaim(address)")]
pub struct CanClaimCall {
    pub user: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "CLAIM_THRESHOLD", abi = "CLAIM_THRESHOLD()")]
pub struct ClaimThresholdCall;

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "CLAIM_INTERVAL", abi = "CLAIM_INTERVAL()")]
pub struct ClaimIntervalCall;

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "claimTokens", abi = "claimTokens()")]
pub struct ClaimTokensCall;

#[derive(Clone, Debug, PartialEq, Eq, EthCall)]
#[ethcall(name = "lastClaimTime", abi = "lastClaimTime(address)")]
pub struct LastClaimTimeCall {
    pub user: Address,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::{AbiDecode, AbiEncode};
    use ethers::utils::keccak256;

    #[test]
    fn quiz_created_topic_matches_canonical_signature() {
        let expected = keccak256(
            "QuizCreated(uint256,address,string,uint256,uint256,uint256,uint256)".as_bytes(),
        );
        assert_eq!(QuizCreatedEvent::signature(), H256::from(expected));
    }

    #[test]
    fn approve_selector_is_the_erc20_one() {
        assert_eq!(ApproveCall::selector(), [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(BalanceOfCall::selector(), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn quizzes_return_decodes_flat_tuple() {
        let quiz = QuizzesReturn {
            owner: Address::repeat_byte(0x11),
            name: "Algebra Basics".to_string(),
            token_reward: U256::from(10u64),
            total_tokens: U256::from(50u64),
            taker_limit: U256::from(5u64),
            taker_count: U256::from(2u64),
            winner_count: U256::from(1u64),
            start_date: U256::from(1_735_689_600u64),
            end_date: U256::from(1_738_368_000u64),
            active: true,
        };

        // Getter output is the bare field list, with no leading tuple offset.
        let encoded = quiz.clone().encode();
        assert_eq!(&encoded[12..32], quiz.owner.as_bytes());

        let decoded = QuizzesReturn::decode(encoded).unwrap();
        assert_eq!(decoded, quiz);
    }
}
