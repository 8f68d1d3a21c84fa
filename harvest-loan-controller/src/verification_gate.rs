// ==========================================================================
// MÓDULO: harvest-loan-controller/src/verification_gate.rs
// Descrição: Nível de confiança dos produtores e tetos de empréstimo
//            derivados; atualizado apenas pelo verificador configurado
// ==========================================================================

multiversx_sc::imports!();

use common_types::*;

#[multiversx_sc::module]
pub trait VerificationGateModule {
    // Define o endereço autorizado a gravar níveis de verificação
    #[only_owner]
    #[endpoint(setVerifierAddress)]
    fn set_verifier_address(&self, verifier_address: ManagedAddress) {
        let caller = self.blockchain().get_caller();
        require!(
            caller == self.blockchain().get_owner_address(),
            ERR_NOT_OWNER
        );
        require!(!verifier_address.is_zero(), ERR_VERIFIER_ADDRESS_ZERO);
        self.verifier_address().set(verifier_address);
    }

    // Upsert idempotente do nível de um produtor, com a evidência que
    // sustentou a avaliação
    #[endpoint(setVerificationLevel)]
    fn set_verification_level(&self, farmer: ManagedAddress, level: u8, evidence_hash: ManagedBuffer) {
        self.require_caller_is_verifier();
        require!(
            level >= DEFAULT_VERIFICATION_LEVEL && level <= MAX_VERIFICATION_LEVEL,
            ERR_INVALID_LEVEL
        );

        let verifier = self.blockchain().get_caller();
        let verified_at = self.blockchain().get_block_timestamp();

        self.farmer_verifications(farmer.clone()).set(FarmerVerification {
            farmer: farmer.clone(),
            level,
            verified_at,
            verifier,
            active: true,
        });
        self.verification_evidence(farmer.clone()).set(evidence_hash);

        self.verification_level_set_event(farmer, level);
    }

    // Revoga a verificação; o produtor volta ao nível padrão
    #[endpoint(revokeVerification)]
    fn revoke_verification(&self, farmer: ManagedAddress) {
        self.require_caller_is_verifier();

        if self.farmer_verifications(farmer.clone()).is_empty() {
            return;
        }

        let mut verification = self.farmer_verifications(farmer.clone()).get();
        verification.active = false;
        self.farmer_verifications(farmer.clone()).set(verification);

        self.verification_revoked_event(farmer);
    }

    // Nível efetivo do produtor; 1 quando nunca avaliado ou revogado
    #[view(getVerificationLevel)]
    fn get_verification_level(&self, farmer: ManagedAddress) -> u8 {
        if self.farmer_verifications(farmer.clone()).is_empty() {
            return DEFAULT_VERIFICATION_LEVEL;
        }
        let verification = self.farmer_verifications(farmer).get();
        if verification.active {
            verification.level
        } else {
            DEFAULT_VERIFICATION_LEVEL
        }
    }

    #[view(getVerification)]
    fn get_verification(&self, farmer: ManagedAddress) -> FarmerVerification<Self::Api> {
        require!(
            !self.farmer_verifications(farmer.clone()).is_empty(),
            ERR_VERIFICATION_NOT_FOUND
        );
        self.farmer_verifications(farmer).get()
    }

    // Tabela de tetos por nível. O nível 4 não tem teto; a view devolve o
    // sentinela, e o caminho de solicitação pula a checagem nesse nível.
    #[view(getMaxLoanForLevel)]
    fn max_loan_for_level(&self, level: u8) -> BigUint {
        require!(
            level >= DEFAULT_VERIFICATION_LEVEL && level <= MAX_VERIFICATION_LEVEL,
            ERR_INVALID_LEVEL
        );
        match level {
            1 => self.level_one_cap().get(),
            2 => self.level_two_cap().get(),
            3 => self.level_three_cap().get(),
            _ => self.unbounded_loan_sentinel(),
        }
    }

    // Sentinela u64::MAX construído pelos bytes, fora do caminho de
    // inteiros pequenos da VM
    fn unbounded_loan_sentinel(&self) -> BigUint {
        BigUint::from_bytes_be_buffer(&ManagedBuffer::new_from_bytes(&u64::MAX.to_be_bytes()))
    }

    fn require_caller_is_verifier(&self) {
        require!(!self.verifier_address().is_empty(), ERR_VERIFIER_NOT_SET);
        require!(
            self.blockchain().get_caller() == self.verifier_address().get(),
            ERR_NOT_VERIFIER
        );
    }

    #[event("verification_level_set")]
    fn verification_level_set_event(&self, #[indexed] farmer: ManagedAddress, #[indexed] level: u8);

    #[event("verification_revoked")]
    fn verification_revoked_event(&self, #[indexed] farmer: ManagedAddress);

    // --- Storage mappers ---
    #[storage_mapper("verifier_address")]
    fn verifier_address(&self) -> SingleValueMapper<ManagedAddress>;

    #[storage_mapper("farmer_verifications")]
    fn farmer_verifications(&self, farmer: ManagedAddress) -> SingleValueMapper<FarmerVerification<Self::Api>>;

    #[storage_mapper("verification_evidence")]
    fn verification_evidence(&self, farmer: ManagedAddress) -> SingleValueMapper<ManagedBuffer>;

    #[storage_mapper("level_one_cap")]
    fn level_one_cap(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("level_two_cap")]
    fn level_two_cap(&self) -> SingleValueMapper<BigUint>;

    #[storage_mapper("level_three_cap")]
    fn level_three_cap(&self) -> SingleValueMapper<BigUint>;
}
