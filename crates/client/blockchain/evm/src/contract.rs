//! Arena and warriors contract bindings.
//!
//! Function, event and error signatures exactly as declared by the deployed
//! contracts. Selectors, topics and argument encoding come from [`sol!`].

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{Revert, SolCall, SolError, sol};
use arena_core::{MoveSelection, Side, WarriorId};

sol! {
    /// Battle arena contract.
    #[derive(Debug, PartialEq, Eq)]
    interface IArena {
        function getCurrentRound() external view returns (uint8);
        function getIsInitialized() external view returns (bool);
        function getIsBattleOngoing() external view returns (bool);
        function getIsGameFinished() external view returns (bool);
        function getInitializationTimestamp() external view returns (uint256);
        function getLastRoundEndedAt() external view returns (uint256);
        function getMinBettingPeriod() external view returns (uint256);
        function getMinBattleRoundsInterval() external view returns (uint256);
        function getDamageOnWarriorsOne() external view returns (uint256);
        function getDamageOnWarriorsTwo() external view returns (uint256);
        function getWarriorsOneNFTId() external view returns (uint256);
        function getWarriorsTwoNFTId() external view returns (uint256);
        function getPlayerOneBetAddresses() external view returns (address[] memory);
        function getPlayerTwoBetAddresses() external view returns (address[] memory);
        function getBetAmount() external view returns (uint256);
        function getWarriorsOneInfluenceCost() external view returns (uint256);
        function getWarriorsTwoInfluenceCost() external view returns (uint256);
        function getWarriorsOneDefluenceCost() external view returns (uint256);
        function getWarriorsTwoDefluenceCost() external view returns (uint256);

        function initialize(uint256 warriorsOneNFTId, uint256 warriorsTwoNFTId) external;
        function startGame() external;
        function battle(uint8 warriorsOneMove, uint8 warriorsTwoMove, bytes signedData) external;
        function betOnWarriorsOne(uint256 multiplier) external;
        function betOnWarriorsTwo(uint256 multiplier) external;
        function influenceWarriorsOne() external;
        function influenceWarriorsTwo() external;
        function defluenceWarriorsOne() external;
        function defluenceWarriorsTwo() external;

        event RoundOver(uint256 round, uint256 damageOnWarriorsOne, uint256 damageOnWarriorsTwo);
        event GameStarted(uint256 startedAt);
        event GameFinished(uint256 winner, uint256 damageOnWarriorsOne, uint256 damageOnWarriorsTwo);
        event WarriorsMoveExecuted(address indexed executor, uint8 moveIndex, uint256 damageOnOpponent, uint256 recovery, bool dodged);
        event WarriorsInfluenced(address indexed influencer, uint256 warriorsNFTId, uint256 cost);
        event WarriorsDefluenced(address indexed defluencer, uint256 warriorsNFTId, uint256 cost);
        event BetPlaced(address indexed bettor, uint256 warriorsNFTId, uint256 multiplier);
    }

    /// Warriors NFT contract; traits are five `uint16` values.
    interface IWarriors {
        function getTraits(uint256 tokenId) external view returns (
            uint16 strength,
            uint16 wit,
            uint16 charisma,
            uint16 defence,
            uint16 luck
        );
    }
}

pub fn initialize(a: WarriorId, b: WarriorId) -> Vec<u8> {
    IArena::initializeCall {
        warriorsOneNFTId: U256::from(a.0),
        warriorsTwoNFTId: U256::from(b.0),
    }
    .abi_encode()
}

pub fn start_game() -> Vec<u8> {
    IArena::startGameCall {}.abi_encode()
}

pub fn battle(selection: MoveSelection, signature: &[u8]) -> Vec<u8> {
    IArena::battleCall {
        warriorsOneMove: selection.a.as_u8(),
        warriorsTwoMove: selection.b.as_u8(),
        signedData: Bytes::copy_from_slice(signature),
    }
    .abi_encode()
}

pub fn bet(side: Side, multiplier: u64) -> Vec<u8> {
    let multiplier = U256::from(multiplier);
    match side {
        Side::A => IArena::betOnWarriorsOneCall { multiplier }.abi_encode(),
        Side::B => IArena::betOnWarriorsTwoCall { multiplier }.abi_encode(),
    }
}

pub fn influence(side: Side) -> Vec<u8> {
    match side {
        Side::A => IArena::influenceWarriorsOneCall {}.abi_encode(),
        Side::B => IArena::influenceWarriorsTwoCall {}.abi_encode(),
    }
}

pub fn defluence(side: Side) -> Vec<u8> {
    match side {
        Side::A => IArena::defluenceWarriorsOneCall {}.abi_encode(),
        Side::B => IArena::defluenceWarriorsTwoCall {}.abi_encode(),
    }
}

/// Message of an `Error(string)` revert payload.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data).ok().map(|revert| revert.reason)
}
