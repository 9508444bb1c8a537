//! Chainlink aggregator and feed registry contract bindings.

use alloy::sol;

// Chainlink Aggregator V2V3 interface
sol! {
    #[sol(rpc)]
    interface IAggregatorV2V3 {
        function decimals() external view returns (uint8);
        function description() external view returns (string memory);
        function version() external view returns (uint256);

        function getRoundData(uint80 _roundId)
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );

        function latestRoundData()
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );

        function latestAnswer() external view returns (int256);
        function latestTimestamp() external view returns (uint256);
        function latestRound() external view returns (uint256);
        function getAnswer(uint256 roundId) external view returns (int256);
        function getTimestamp(uint256 roundId) external view returns (uint256);
    }
}

// Proxy accessor used to classify an assigned feed
sol! {
    #[sol(rpc)]
    interface IAggregatorProxy {
        function aggregator() external view returns (address);
    }
}

// Registry ABI surface served by `FeedRegistry::execute`
sol! {
    interface IFeedRegistry {
        struct FeedParams {
            address base;
            address quote;
            address feed;
        }

        event FeedsModified(FeedParams[] feeds);

        function assignFeeds(FeedParams[] calldata feeds) external;
        function sendDust(address recipient, address token, uint256 amount) external;
        function getAssignedFeed(address base, address quote) external view returns (address feed, bool isProxy);
        function getFeed(address base, address quote) external view returns (address aggregator);

        function SUPER_ADMIN_ROLE() external view returns (bytes32);
        function ADMIN_ROLE() external view returns (bytes32);
        function hasRole(bytes32 role, address account) external view returns (bool);
        function getRoleAdmin(bytes32 role) external view returns (bytes32);
        function grantRole(bytes32 role, address account) external;
        function revokeRole(bytes32 role, address account) external;

        function decimals(address base, address quote) external view returns (uint8);
        function description(address base, address quote) external view returns (string memory);
        function version(address base, address quote) external view returns (uint256);
        function latestRoundData(address base, address quote)
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
        function getRoundData(address base, address quote, uint80 _roundId)
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
        function latestAnswer(address base, address quote) external view returns (int256 answer);
        function latestTimestamp(address base, address quote) external view returns (uint256 timestamp);
        function latestRound(address base, address quote) external view returns (uint256 roundId);
        function getAnswer(address base, address quote, uint256 roundId) external view returns (int256 answer);
        function getTimestamp(address base, address quote, uint256 roundId) external view returns (uint256 timestamp);

        function getPhaseFeed(address base, address quote, uint16 phaseId) external view returns (address aggregator);
        function isFeedEnabled(address aggregator) external view returns (bool);
        function getPhase(address base, address quote, uint16 phaseId)
            external
            view
            returns (uint16 id, uint80 startingAggregatorRoundId, uint80 endingAggregatorRoundId);
        function getRoundFeed(address base, address quote, uint80 roundId) external view returns (address aggregator);
        function getPhaseRange(address base, address quote, uint16 phaseId)
            external
            view
            returns (uint80 startingRoundId, uint80 endingRoundId);
        function getPreviousRoundId(address base, address quote, uint80 roundId) external view returns (uint80 previousRoundId);
        function getNextRoundId(address base, address quote, uint80 roundId) external view returns (uint80 nextRoundId);
        function proposeFeed(address base, address quote, address aggregator) external;
        function confirmFeed(address base, address quote, address aggregator) external;
        function getProposedFeed(address base, address quote) external view returns (address proposedAggregator);
        function proposedGetRoundData(address base, address quote, uint80 roundId)
            external
            view
            returns (
                uint80 id,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
        function proposedLatestRoundData(address base, address quote)
            external
            view
            returns (
                uint80 id,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
        function getCurrentPhaseId(address base, address quote) external view returns (uint16 currentPhaseId);
    }
}
