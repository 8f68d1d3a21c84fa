// ==========================================================================
// MÓDULO: harvest-loan-controller/src/collateral_registry.rs
// Descrição: Registro das garantias de safra futura — criação, bloqueio por
//            um empréstimo e liberação após a quitação
// ==========================================================================

multiversx_sc::imports!();

use common_types::*;

#[multiversx_sc::module]
pub trait CollateralRegistryModule {
    // Registra uma nova garantia de safra futura; o chamador é o dono.
    // A avaliação fica em unidades mínimas do token de financiamento.
    #[endpoint(registerCollateral)]
    fn register_collateral(
        &self,
        crop_type: ManagedBuffer,
        expected_yield: u64,
        estimated_value: BigUint,
        harvest_date: u64,
        farm_location: ManagedBuffer,
        farm_size: u64,
    ) -> u64 {
        require!(expected_yield > 0, ERR_INVALID_EXPECTED_YIELD);
        require!(estimated_value > BigUint::zero(), ERR_INVALID_ESTIMATED_VALUE);

        let current_timestamp = self.blockchain().get_block_timestamp();
        require!(harvest_date > current_timestamp, ERR_HARVEST_DATE_NOT_FUTURE);

        let owner = self.blockchain().get_caller();
        let collateral_id = self.collateral_counter().get() + 1;
        self.collateral_counter().set(collateral_id);

        self.collateral_records(collateral_id).set(CollateralRecord {
            id: collateral_id,
            owner: owner.clone(),
            crop_type,
            expected_yield,
            estimated_value,
            harvest_date,
            farm_location,
            farm_size,
            active: true,
            locked_by: None,
        });

        self.collateral_registered_event(&owner, collateral_id);

        collateral_id
    }

    // Bloqueia a garantia para um empréstimo. Uma garantia só pode estar
    // presa a um empréstimo ativo por vez.
    fn lock_collateral(&self, collateral_id: u64, loan_id: u64, caller: &ManagedAddress) {
        require!(
            !self.collateral_records(collateral_id).is_empty(),
            ERR_COLLATERAL_NOT_FOUND
        );

        let mut record = self.collateral_records(collateral_id).get();
        require!(&record.owner == caller, ERR_NOT_COLLATERAL_OWNER);
        require!(record.locked_by.is_none(), ERR_COLLATERAL_ALREADY_LOCKED);
        require!(record.active, ERR_COLLATERAL_INACTIVE);

        record.active = false;
        record.locked_by = Some(loan_id);
        self.collateral_records(collateral_id).set(record);

        self.collateral_locked_event(collateral_id, loan_id);
    }

    // Libera a garantia na quitação do empréstimo. Com a política de
    // aposentadoria ligada, o registro não volta a ficar ativo.
    fn release_collateral(&self, collateral_id: u64) {
        let mut record = self.collateral_records(collateral_id).get();
        record.locked_by = None;
        record.active = !self.retire_collateral_on_release().get();
        self.collateral_records(collateral_id).set(record);

        self.collateral_released_event(collateral_id);
    }

    // Política configurável: garantia liberada volta a ser reutilizável
    // (padrão) ou é aposentada em definitivo
    #[only_owner]
    #[endpoint(setCollateralReusePolicy)]
    fn set_collateral_reuse_policy(&self, retire_on_release: bool) {
        let caller = self.blockchain().get_caller();
        require!(
            caller == self.blockchain().get_owner_address(),
            ERR_NOT_OWNER
        );
        self.retire_collateral_on_release().set(retire_on_release);
    }

    #[view(isCollateralActive)]
    fn is_collateral_active(&self, collateral_id: u64) -> bool {
        if self.collateral_records(collateral_id).is_empty() {
            return false;
        }
        self.collateral_records(collateral_id).get().active
    }

    #[view(getCollateral)]
    fn get_collateral(&self, collateral_id: u64) -> CollateralRecord<Self::Api> {
        require!(
            !self.collateral_records(collateral_id).is_empty(),
            ERR_COLLATERAL_NOT_FOUND
        );
        self.collateral_records(collateral_id).get()
    }

    // Eventos para auditoria
    #[event("collateral_registered")]
    fn collateral_registered_event(
        &self,
        #[indexed] owner: &ManagedAddress,
        #[indexed] collateral_id: u64,
    );

    #[event("collateral_locked")]
    fn collateral_locked_event(
        &self,
        #[indexed] collateral_id: u64,
        #[indexed] loan_id: u64,
    );

    #[event("collateral_released")]
    fn collateral_released_event(&self, #[indexed] collateral_id: u64);

    // --- Storage mappers ---
    #[storage_mapper("collateral_counter")]
    fn collateral_counter(&self) -> SingleValueMapper<u64>;

    #[storage_mapper("collateral_records")]
    fn collateral_records(&self, collateral_id: u64) -> SingleValueMapper<CollateralRecord<Self::Api>>;

    #[storage_mapper("retire_collateral_on_release")]
    fn retire_collateral_on_release(&self) -> SingleValueMapper<bool>;
}
