// ==========================================================================
// MÓDULO: harvest-loan-controller/src/settlement.rs
// Descrição: Quitação do empréstimo e retirada pro-rata idempotente dos
//            investidores sobre o valor quitado
// ==========================================================================

multiversx_sc::imports!();

use common_types::*;

#[multiversx_sc::module]
pub trait SettlementModule:
    crate::collateral_registry::CollateralRegistryModule
    + crate::verification_gate::VerificationGateModule
    + crate::loan_request::LoanRequestModule
    + crate::investment_pool::InvestmentPoolModule
{
    // Quita o empréstimo; o pagamento anexado deve cobrir principal + juros.
    // O que exceder a obrigação permanece retido junto com a sobra de
    // arredondamento das retiradas.
    #[payable("*")]
    #[endpoint(repayLoan)]
    fn repay_loan(&self, loan_id: u64) {
        let caller = self.blockchain().get_caller();
        let payment = self.call_value().egld_or_single_esdt();

        require!(
            payment.token_identifier == self.loan_token().get(),
            ERR_WRONG_PAYMENT_TOKEN
        );
        require!(!self.loans(loan_id).is_empty(), ERR_LOAN_NOT_FOUND);

        let mut loan = self.loans(loan_id).get();
        match loan.status {
            LoanStatus::Funded => {}
            LoanStatus::Pending | LoanStatus::Repaid => sc_panic!(ERR_LOAN_NOT_FUNDED),
        }
        require!(loan.farmer == caller, ERR_NOT_LOAN_FARMER);

        let total_obligation = self.total_obligation_of(&loan);
        require!(payment.amount >= total_obligation, ERR_INSUFFICIENT_REPAYMENT);

        loan.status = LoanStatus::Repaid;
        let collateral_id = loan.collateral_id;
        let due_timestamp = loan.created_at + loan.duration_days * 86400;
        self.loans(loan_id).set(loan);

        // Devolve a garantia na mesma transação da mudança de status
        self.release_collateral(collateral_id);

        // O prazo é apenas informativo: nada expira sozinho, mas pagamentos
        // dentro do prazo contam para o histórico do produtor
        let current_timestamp = self.blockchain().get_block_timestamp();
        if current_timestamp <= due_timestamp {
            self.on_time_repayments(caller.clone()).update(|count| *count += 1);
        }

        self.loan_repaid_event(&caller, loan_id, &payment.amount);
    }

    // Retira a parcela pro-rata de uma entrada de investimento.
    // A fração usa o financiamento congelado na transição para Funded, com
    // arredondamento para baixo; a sobra fica limitada a uma unidade mínima
    // por investimento. Uma segunda chamada sobre a mesma entrada sempre
    // falha e nunca paga duas vezes.
    #[endpoint(withdrawInvestment)]
    fn withdraw_investment(&self, loan_id: u64, investment_index: u64) {
        let caller = self.blockchain().get_caller();

        require!(!self.loans(loan_id).is_empty(), ERR_LOAN_NOT_FOUND);
        let loan = self.loans(loan_id).get();
        match loan.status {
            LoanStatus::Repaid => {}
            LoanStatus::Pending | LoanStatus::Funded => sc_panic!(ERR_LOAN_NOT_REPAID),
        }

        self.require_investment_exists(loan_id, investment_index);
        let mut investment = self.loan_investments(loan_id).get(investment_index as usize);
        require!(investment.investor == caller, ERR_NOT_INVESTMENT_OWNER);
        require!(!investment.withdrawn, ERR_ALREADY_WITHDRAWN);

        let total_obligation = self.total_obligation_of(&loan);
        let share = &investment.amount * &total_obligation / &loan.funded_amount;

        investment.withdrawn = true;
        self.loan_investments(loan_id)
            .set(investment_index as usize, &investment);

        // Transferência e marcação ocorrem na mesma transação
        self.send().direct(&caller, &self.loan_token().get(), 0, &share);

        self.investment_withdrawn_event(&caller, loan_id, investment_index, &share);
    }

    #[view(getTotalObligation)]
    fn get_total_obligation(&self, loan_id: u64) -> BigUint {
        let loan = self.get_loan(loan_id);
        self.total_obligation_of(&loan)
    }

    #[view(getOnTimeRepayments)]
    fn get_on_time_repayments(&self, farmer: ManagedAddress) -> u64 {
        self.on_time_repayments(farmer).get()
    }

    // principal + floor(principal * taxa / 10000)
    fn total_obligation_of(&self, loan: &Loan<Self::Api>) -> BigUint {
        let interest = &loan.requested_amount * &BigUint::from(loan.interest_rate_bps)
            / &BigUint::from(BPS_DENOMINATOR);
        &loan.requested_amount + &interest
    }

    #[event("loan_repaid")]
    fn loan_repaid_event(
        &self,
        #[indexed] farmer: &ManagedAddress,
        #[indexed] loan_id: u64,
        #[indexed] amount_paid: &BigUint,
    );

    #[event("investment_withdrawn")]
    fn investment_withdrawn_event(
        &self,
        #[indexed] investor: &ManagedAddress,
        #[indexed] loan_id: u64,
        #[indexed] investment_index: u64,
        #[indexed] share: &BigUint,
    );

    // --- Storage mappers ---
    #[storage_mapper("on_time_repayments")]
    fn on_time_repayments(&self, farmer: ManagedAddress) -> SingleValueMapper<u64>;
}
