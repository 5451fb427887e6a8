//! ABI definitions for the contracts the client interacts with
//!
//! These only contain the subsets of each interface that the vault tooling
//! calls.
use alloy::sol;

sol! {
    /// An ERC-20 token supporting EIP-2612 permits
    #[sol(rpc)]
    contract IERC20Permit {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function nonces(address owner) external view returns (uint256);

        function approve(address spender, uint256 value) external returns (bool);
        function permit(address owner, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
    }

    /// An ERC-4626 vault with a performance fee
    #[sol(rpc)]
    contract IERC4626 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function asset() external view returns (address);
        function totalAssets() external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function convertToAssets(uint256 shares) external view returns (uint256);
        function maxDeposit(address receiver) external view returns (uint256);
        function maxWithdraw(address owner) external view returns (uint256);
        function fee() external view returns (uint96);
        function feeRecipient() external view returns (address);

        function deposit(uint256 assets, address receiver) external returns (uint256 shares);
        function withdraw(uint256 assets, address receiver, address owner) external returns (uint256 shares);
        function redeem(uint256 shares, address receiver, address owner) external returns (uint256 assets);
    }

    /// The EIP-712 message signed to grant an allowance via EIP-2612
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }

    /// The subset of a Safe (v1.3+) used to build and sign transactions
    #[sol(rpc)]
    contract ISafe {
        function nonce() external view returns (uint256);
        function isOwner(address owner) external view returns (bool);
        function getTransactionHash(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            uint256 _nonce
        ) external view returns (bytes32);
    }

    /// The Safe batching contract, executed via delegate call
    contract IMultiSendCallOnly {
        function multiSend(bytes transactions) external payable;
    }
}
