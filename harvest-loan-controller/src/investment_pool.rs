// ==========================================================================
// MÓDULO: harvest-loan-controller/src/investment_pool.rs
// Descrição: Acumula contribuições de investidores independentes em um
//            empréstimo pendente até o financiamento completo, quando o
//            principal é liberado ao produtor
// ==========================================================================

multiversx_sc::imports!();

use common_types::*;

#[multiversx_sc::module]
pub trait InvestmentPoolModule:
    crate::collateral_registry::CollateralRegistryModule
    + crate::verification_gate::VerificationGateModule
    + crate::loan_request::LoanRequestModule
{
    // Investe em um empréstimo pendente; o valor investido é o pagamento
    // anexado à chamada e o investidor é o chamador.
    // Exceder a capacidade restante rejeita a operação inteira — o valor
    // nunca é cortado, para que o ledger permaneça exato e auditável.
    #[payable("*")]
    #[endpoint(invest)]
    fn invest(&self, loan_id: u64) -> u64 {
        let investor = self.blockchain().get_caller();
        let payment = self.call_value().egld_or_single_esdt();

        require!(
            payment.token_identifier == self.loan_token().get(),
            ERR_WRONG_PAYMENT_TOKEN
        );
        require!(payment.amount > BigUint::zero(), ERR_ZERO_AMOUNT);
        require!(!self.loans(loan_id).is_empty(), ERR_LOAN_NOT_FOUND);

        let mut loan = self.loans(loan_id).get();
        match loan.status {
            LoanStatus::Pending => {}
            LoanStatus::Funded | LoanStatus::Repaid => sc_panic!(ERR_LOAN_NOT_PENDING),
        }

        let remaining = &loan.requested_amount - &loan.funded_amount;
        require!(payment.amount <= remaining, ERR_OVERFUND_ATTEMPT);

        // Cada contribuição vira uma entrada própria, mesmo que o investidor
        // repita; a retirada é contabilizada por entrada
        let invested_at = self.blockchain().get_block_timestamp();
        self.loan_investments(loan_id).push(&Investment {
            investor: investor.clone(),
            loan_id,
            amount: payment.amount.clone(),
            invested_at,
            withdrawn: false,
        });
        let investment_index = self.loan_investments(loan_id).len() as u64;

        loan.funded_amount += &payment.amount;
        let fully_funded = loan.funded_amount == loan.requested_amount;
        if fully_funded {
            loan.status = LoanStatus::Funded;
        }
        let farmer = loan.farmer.clone();
        let principal = loan.requested_amount.clone();
        self.loans(loan_id).set(loan);

        self.investment_made_event(&investor, loan_id, investment_index, &payment.amount);

        // Com o financiamento completo, o principal segue para o produtor na
        // mesma transação em que o status muda; qualquer falha reverte tudo
        if fully_funded {
            self.send().direct(&farmer, &self.loan_token().get(), 0, &principal);
            self.loan_funded_event(loan_id, &principal);
        }

        investment_index
    }

    #[view(getInvestment)]
    fn get_investment(&self, loan_id: u64, investment_index: u64) -> Investment<Self::Api> {
        self.require_investment_exists(loan_id, investment_index);
        self.loan_investments(loan_id).get(investment_index as usize)
    }

    #[view(getLoanInvestmentCount)]
    fn get_loan_investment_count(&self, loan_id: u64) -> u64 {
        self.loan_investments(loan_id).len() as u64
    }

    #[view(getRemainingFunding)]
    fn get_remaining_funding(&self, loan_id: u64) -> BigUint {
        let loan = self.get_loan(loan_id);
        &loan.requested_amount - &loan.funded_amount
    }

    #[view(getLoanToken)]
    fn get_loan_token(&self) -> EgldOrEsdtTokenIdentifier {
        self.loan_token().get()
    }

    // Índices do VecMapper começam em 1
    fn require_investment_exists(&self, loan_id: u64, investment_index: u64) {
        require!(
            investment_index >= 1
                && investment_index <= self.loan_investments(loan_id).len() as u64,
            ERR_INVESTMENT_NOT_FOUND
        );
    }

    #[event("investment_made")]
    fn investment_made_event(
        &self,
        #[indexed] investor: &ManagedAddress,
        #[indexed] loan_id: u64,
        #[indexed] investment_index: u64,
        #[indexed] amount: &BigUint,
    );

    #[event("loan_funded")]
    fn loan_funded_event(&self, #[indexed] loan_id: u64, #[indexed] principal: &BigUint);

    // --- Storage mappers ---

    // Token único de financiamento aceito pelo ledger
    #[storage_mapper("loan_token")]
    fn loan_token(&self) -> SingleValueMapper<EgldOrEsdtTokenIdentifier>;

    #[storage_mapper("loan_investments")]
    fn loan_investments(&self, loan_id: u64) -> VecMapper<Investment<Self::Api>>;
}
