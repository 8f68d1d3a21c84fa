// ==========================================================================
// MÓDULO: common-types/src/lib.rs
// Descrição: Tipos compartilhados do ledger de crédito agrícola — registros
//            de garantia de safra, verificação de produtores, empréstimos e
//            investimentos, além das mensagens de erro padronizadas
// ==========================================================================

#![no_std]

multiversx_sc::imports!();
multiversx_sc::derive_imports!();

/// Status do empréstimo. As transições válidas são apenas
/// Pending -> Funded -> Repaid; todo ponto de transição faz `match`
/// exaustivo para que um novo estado nunca passe despercebido.
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, PartialEq, Eq, Clone, Debug)]
pub enum LoanStatus {
    Pending,
    Funded,
    Repaid,
}

// Registro de garantia: uma reivindicação tokenizada sobre uma safra futura
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct CollateralRecord<M: ManagedTypeApi> {
    pub id: u64,
    pub owner: ManagedAddress<M>,
    pub crop_type: ManagedBuffer<M>,
    pub expected_yield: u64,
    pub estimated_value: BigUint<M>,
    pub harvest_date: u64,
    pub farm_location: ManagedBuffer<M>,
    pub farm_size: u64,
    pub active: bool,
    pub locked_by: Option<u64>,
}

// Registro de verificação de um produtor, gravado pelo verificador externo
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct FarmerVerification<M: ManagedTypeApi> {
    pub farmer: ManagedAddress<M>,
    pub level: u8,
    pub verified_at: u64,
    pub verifier: ManagedAddress<M>,
    pub active: bool,
}

// Dados do empréstimo
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct Loan<M: ManagedTypeApi> {
    pub farmer: ManagedAddress<M>,
    pub collateral_id: u64,
    pub requested_amount: BigUint<M>,
    pub interest_rate_bps: u64,
    pub duration_days: u64,
    pub status: LoanStatus,
    pub funded_amount: BigUint<M>,
    pub created_at: u64,
}

// Entrada individual de investimento; nunca é mesclada com outras do mesmo
// investidor, para que a retirada seja contabilizada por entrada
#[type_abi]
#[derive(TopEncode, TopDecode, NestedEncode, NestedDecode, Clone)]
pub struct Investment<M: ManagedTypeApi> {
    pub investor: ManagedAddress<M>,
    pub loan_id: u64,
    pub amount: BigUint<M>,
    pub invested_at: u64,
    pub withdrawn: bool,
}

/// Nível de verificação mínimo, usado quando o produtor nunca foi avaliado
/// ou quando sua verificação foi revogada.
pub const DEFAULT_VERIFICATION_LEVEL: u8 = 1;
pub const MAX_VERIFICATION_LEVEL: u8 = 4;

/// Base dos percentuais em pontos base (10000 = 100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Prazo máximo de um empréstimo: 10 anos. Mantém a aritmética de
/// vencimento (created_at + prazo em segundos) longe de overflow de u64.
pub const MAX_LOAN_DURATION_DAYS: u64 = 3_650;

// --- Mensagens de erro ---
// Erros de validação: entrada malformada ou fora de faixa
pub const ERR_INVALID_EXPECTED_YIELD: &str = "Expected yield must be positive";
pub const ERR_INVALID_ESTIMATED_VALUE: &str = "Estimated value must be positive";
pub const ERR_HARVEST_DATE_NOT_FUTURE: &str = "Harvest date must be in the future";
pub const ERR_ZERO_AMOUNT: &str = "Amount must be greater than zero";
pub const ERR_INVALID_DURATION: &str = "Duration must be greater than zero";
pub const ERR_DURATION_TOO_LONG: &str = "Duration exceeds maximum term";
pub const ERR_INVALID_INTEREST_RATE: &str = "Interest rate basis points out of valid range";
pub const ERR_INVALID_LEVEL: &str = "Verification level out of valid range";
pub const ERR_INVALID_LTV_BPS: &str = "LTV basis points out of valid range";
pub const ERR_INVALID_LEVEL_CAPS: &str = "Level caps must be non-decreasing";
pub const ERR_WRONG_PAYMENT_TOKEN: &str = "Payment token does not match loan token";

// Violações de política: limites de LTV, de nível e de financiamento
pub const ERR_EXCEEDS_LTV: &str = "Requested amount exceeds collateral LTV limit";
pub const ERR_EXCEEDS_VERIFICATION_CAP: &str = "Requested amount exceeds verification level cap";
pub const ERR_OVERFUND_ATTEMPT: &str = "Investment exceeds remaining funding amount";

// Conflitos de estado: transição errada, dupla retirada, chamador errado
pub const ERR_COLLATERAL_NOT_FOUND: &str = "Collateral does not exist";
pub const ERR_COLLATERAL_INACTIVE: &str = "Collateral is not active";
pub const ERR_COLLATERAL_ALREADY_LOCKED: &str = "Collateral is already locked";
pub const ERR_NOT_COLLATERAL_OWNER: &str = "Only the collateral owner can pledge it";
pub const ERR_LOAN_NOT_FOUND: &str = "Loan does not exist";
pub const ERR_LOAN_NOT_PENDING: &str = "Loan is not pending";
pub const ERR_LOAN_NOT_FUNDED: &str = "Loan is not funded";
pub const ERR_LOAN_NOT_REPAID: &str = "Loan is not repaid";
pub const ERR_NOT_LOAN_FARMER: &str = "Only the loan farmer can repay";
pub const ERR_INSUFFICIENT_REPAYMENT: &str = "Repayment below total obligation";
pub const ERR_INVESTMENT_NOT_FOUND: &str = "Investment does not exist";
pub const ERR_NOT_INVESTMENT_OWNER: &str = "Only the investor can withdraw this entry";
pub const ERR_ALREADY_WITHDRAWN: &str = "Investment already withdrawn";
pub const ERR_VERIFICATION_NOT_FOUND: &str = "Farmer was never verified";
pub const ERR_VERIFIER_NOT_SET: &str = "Verifier not configured";
pub const ERR_NOT_VERIFIER: &str = "Only the verifier can update levels";
pub const ERR_VERIFIER_ADDRESS_ZERO: &str = "Verifier address cannot be zero";
pub const ERR_NOT_OWNER: &str = "Only the contract owner can configure this";
