// ==========================================================================
// MÓDULO: harvest-loan-controller/src/harvest_loan_controller.rs
// Descrição: Contrato inteligente do ledger de crédito agrícola — produtores
//            dão uma garantia de safra futura como lastro, investidores
//            independentes financiam o empréstimo em conjunto e retiram sua
//            parcela pro-rata após a quitação
// ==========================================================================

#![no_std]

multiversx_sc::imports!();

use common_types::*;

pub mod collateral_registry;
pub mod investment_pool;
pub mod loan_request;
pub mod settlement;
pub mod verification_gate;

// Os cinco componentes do ledger são módulos de um único contrato: cada
// operação mutadora roda como uma transação atômica sobre o estado inteiro,
// e os supertraits são a única porta de um componente para o estado do outro
#[multiversx_sc::contract]
pub trait HarvestLoanController:
    collateral_registry::CollateralRegistryModule
    + verification_gate::VerificationGateModule
    + loan_request::LoanRequestModule
    + investment_pool::InvestmentPoolModule
    + settlement::SettlementModule
{
    // Inicializa o contrato com o token de financiamento, o teto de LTV em
    // pontos base (7000 = 70%) e os tetos de empréstimo dos níveis 1 a 3;
    // o nível 4 é ilimitado
    #[init]
    fn init(
        &self,
        loan_token: EgldOrEsdtTokenIdentifier,
        max_ltv_bps: u64,
        level_one_cap: BigUint,
        level_two_cap: BigUint,
        level_three_cap: BigUint,
    ) {
        require!(
            max_ltv_bps > 0 && max_ltv_bps <= BPS_DENOMINATOR,
            ERR_INVALID_LTV_BPS
        );
        require!(
            level_one_cap <= level_two_cap && level_two_cap <= level_three_cap,
            ERR_INVALID_LEVEL_CAPS
        );

        self.loan_token().set(loan_token);
        self.max_ltv_bps().set(max_ltv_bps);
        self.level_one_cap().set(level_one_cap);
        self.level_two_cap().set(level_two_cap);
        self.level_three_cap().set(level_three_cap);
    }
}
