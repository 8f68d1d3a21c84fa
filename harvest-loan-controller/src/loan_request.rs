// ==========================================================================
// MÓDULO: harvest-loan-controller/src/loan_request.rs
// Descrição: Criação de solicitações de empréstimo contra uma garantia
//            registrada, impondo o teto de LTV e o teto do nível de
//            verificação do produtor
// ==========================================================================

multiversx_sc::imports!();

use common_types::*;

#[multiversx_sc::module]
pub trait LoanRequestModule:
    crate::collateral_registry::CollateralRegistryModule
    + crate::verification_gate::VerificationGateModule
{
    // Solicita um empréstimo contra uma garantia do chamador.
    // Todas as pré-condições são checadas antes de qualquer escrita, de modo
    // que uma rejeição nunca deixa efeito parcial no ledger.
    #[endpoint(requestLoan)]
    fn request_loan(
        &self,
        collateral_id: u64,
        amount: BigUint,
        interest_rate_bps: u64,
        duration_days: u64,
    ) -> u64 {
        let farmer = self.blockchain().get_caller();

        require!(amount > BigUint::zero(), ERR_ZERO_AMOUNT);
        require!(duration_days > 0, ERR_INVALID_DURATION);
        require!(duration_days <= MAX_LOAN_DURATION_DAYS, ERR_DURATION_TOO_LONG);
        require!(interest_rate_bps <= BPS_DENOMINATOR, ERR_INVALID_INTEREST_RATE);
        require!(
            !self.collateral_records(collateral_id).is_empty(),
            ERR_COLLATERAL_NOT_FOUND
        );

        let collateral = self.collateral_records(collateral_id).get();
        require!(collateral.owner == farmer, ERR_NOT_COLLATERAL_OWNER);
        require!(collateral.locked_by.is_none(), ERR_COLLATERAL_ALREADY_LOCKED);
        require!(collateral.active, ERR_COLLATERAL_INACTIVE);

        // Teto de LTV: no máximo max_ltv_bps da avaliação da garantia,
        // com arredondamento para baixo
        let ltv_limit = &collateral.estimated_value * &BigUint::from(self.max_ltv_bps().get())
            / &BigUint::from(BPS_DENOMINATOR);
        require!(amount <= ltv_limit, ERR_EXCEEDS_LTV);

        // Teto do nível de verificação; o nível 4 não tem limite
        let level = self.get_verification_level(farmer.clone());
        if level < MAX_VERIFICATION_LEVEL {
            require!(
                amount <= self.max_loan_for_level(level),
                ERR_EXCEEDS_VERIFICATION_CAP
            );
        }

        let loan_id = self.loan_counter().get() + 1;
        self.loan_counter().set(loan_id);

        // Prende a garantia ao empréstimo recém-criado; o registro impõe as
        // próprias invariantes de bloqueio
        self.lock_collateral(collateral_id, loan_id, &farmer);

        let created_at = self.blockchain().get_block_timestamp();
        self.loans(loan_id).set(Loan {
            farmer: farmer.clone(),
            collateral_id,
            requested_amount: amount.clone(),
            interest_rate_bps,
            duration_days,
            status: LoanStatus::Pending,
            funded_amount: BigUint::zero(),
            created_at,
        });

        self.farmer_loans(farmer.clone()).push(&loan_id);

        self.loan_requested_event(&farmer, loan_id, &amount);

        loan_id
    }

    #[view(getLoan)]
    fn get_loan(&self, loan_id: u64) -> Loan<Self::Api> {
        require!(!self.loans(loan_id).is_empty(), ERR_LOAN_NOT_FOUND);
        self.loans(loan_id).get()
    }

    #[view(getLoanStatus)]
    fn get_loan_status(&self, loan_id: u64) -> LoanStatus {
        self.get_loan(loan_id).status
    }

    #[view(getFarmerLoans)]
    fn get_farmer_loans(&self, farmer: ManagedAddress) -> MultiValueEncoded<u64> {
        let mut loan_ids = MultiValueEncoded::new();
        for loan_id in self.farmer_loans(farmer).iter() {
            loan_ids.push(loan_id);
        }
        loan_ids
    }

    #[view(getMaxLtvBps)]
    fn get_max_ltv_bps(&self) -> u64 {
        self.max_ltv_bps().get()
    }

    #[event("loan_requested")]
    fn loan_requested_event(
        &self,
        #[indexed] farmer: &ManagedAddress,
        #[indexed] loan_id: u64,
        #[indexed] amount: &BigUint,
    );

    // --- Storage mappers ---
    #[storage_mapper("loan_counter")]
    fn loan_counter(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("loans")]
    fn loans(&self, loan_id: u64) -> SingleValueMapper<Loan<Self::Api>>;

    #[storage_mapper("farmer_loans")]
    fn farmer_loans(&self, farmer: ManagedAddress) -> VecMapper<u64>;

    // Teto de LTV em pontos base (7000 = 70%)
    #[storage_mapper("max_ltv_bps")]
    fn max_ltv_bps(&self) -> SingleValueMapper<u64>;
}
