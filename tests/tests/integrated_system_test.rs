// ==========================================================================
// ARQUIVO: integrated_system_test.rs
// Descrição: Teste integrado do ciclo de vida completo do ledger — registro
//            da garantia, solicitação, financiamento coletivo, quitação e
//            retiradas pro-rata, com conferência de saldos a cada etapa
// ==========================================================================

use multiversx_sc::types::{Address, EgldOrEsdtTokenIdentifier};
use multiversx_sc_scenario::api::DebugApi;
use multiversx_sc_scenario::{
    managed_address, managed_biguint, managed_buffer, rust_biguint,
    testing_framework::{BlockchainStateWrapper, ContractObjWrapper},
};

use common_types::*;
use harvest_loan_controller::collateral_registry::CollateralRegistryModule;
use harvest_loan_controller::investment_pool::InvestmentPoolModule;
use harvest_loan_controller::loan_request::LoanRequestModule;
use harvest_loan_controller::settlement::SettlementModule;
use harvest_loan_controller::verification_gate::VerificationGateModule;
use harvest_loan_controller::HarvestLoanController;

const WASM_PATH: &str = "output/harvest-loan-controller.wasm";
const SETUP_TIMESTAMP: u64 = 1_000;
const HARVEST_DATE: u64 = 1_000_000;

// Estrutura para configuração do sistema integrado
struct IntegratedSystemSetup<ContractObjBuilder>
where
    ContractObjBuilder: 'static + Copy + Fn() -> harvest_loan_controller::ContractObj<DebugApi>,
{
    pub blockchain_wrapper: BlockchainStateWrapper,
    pub verifier_address: Address,
    pub farmer_a_address: Address,
    pub farmer_b_address: Address,
    pub investor_a_address: Address,
    pub investor_b_address: Address,
    pub contract_wrapper:
        ContractObjWrapper<harvest_loan_controller::ContractObj<DebugApi>, ContractObjBuilder>,
}

fn setup_integrated_system<ContractObjBuilder>(
    builder: ContractObjBuilder,
) -> IntegratedSystemSetup<ContractObjBuilder>
where
    ContractObjBuilder: 'static + Copy + Fn() -> harvest_loan_controller::ContractObj<DebugApi>,
{
    let rust_zero = rust_biguint!(0u64);
    let mut blockchain_wrapper = BlockchainStateWrapper::new();
    let owner_address = blockchain_wrapper.create_user_account(&rust_zero);
    let verifier_address = blockchain_wrapper.create_user_account(&rust_zero);
    let farmer_a_address = blockchain_wrapper.create_user_account(&rust_biguint!(1_000));
    let farmer_b_address = blockchain_wrapper.create_user_account(&rust_biguint!(1_000));
    let investor_a_address = blockchain_wrapper.create_user_account(&rust_biguint!(10_000));
    let investor_b_address = blockchain_wrapper.create_user_account(&rust_biguint!(10_000));

    let contract_wrapper = blockchain_wrapper.create_sc_account(
        &rust_zero,
        Some(&owner_address),
        builder,
        WASM_PATH,
    );

    blockchain_wrapper
        .execute_tx(&owner_address, &contract_wrapper, &rust_zero, |sc| {
            sc.init(
                EgldOrEsdtTokenIdentifier::egld(),
                7_000u64, // LTV de 70%
                managed_biguint!(1_000),
                managed_biguint!(5_000),
                managed_biguint!(20_000),
            );
        })
        .assert_ok();

    blockchain_wrapper
        .execute_tx(&owner_address, &contract_wrapper, &rust_zero, |sc| {
            sc.set_verifier_address(managed_address!(&verifier_address));
        })
        .assert_ok();

    blockchain_wrapper.set_block_timestamp(SETUP_TIMESTAMP);

    IntegratedSystemSetup {
        blockchain_wrapper,
        verifier_address,
        farmer_a_address,
        farmer_b_address,
        investor_a_address,
        investor_b_address,
        contract_wrapper,
    }
}

// Cenários A a F do ciclo de vida, na ordem, com saldos conferidos
#[test]
fn test_full_loan_lifecycle() {
    let mut setup = setup_integrated_system(harvest_loan_controller::contract_obj);
    let farmer = setup.farmer_a_address.clone();
    let investor_a = setup.investor_a_address.clone();
    let investor_b = setup.investor_b_address.clone();

    // Cenário A: garantia de 1000, pedido de 700 a 500bp por 90 dias
    setup
        .blockchain_wrapper
        .execute_tx(&farmer, &setup.contract_wrapper, &rust_biguint!(0), |sc| {
            let collateral_id = sc.register_collateral(
                managed_buffer!(b"soybean"),
                500u64,
                managed_biguint!(1_000),
                HARVEST_DATE,
                managed_buffer!(b"Sorriso MT"),
                150u64,
            );
            let loan_id = sc.request_loan(collateral_id, managed_biguint!(700), 500u64, 90u64);
            assert_eq!(loan_id, 1u64);
            assert_eq!(sc.get_loan_status(loan_id), LoanStatus::Pending);
        })
        .assert_ok();

    // Cenário B: 400 + 300 completam o financiamento
    setup
        .blockchain_wrapper
        .execute_tx(
            &investor_a,
            &setup.contract_wrapper,
            &rust_biguint!(400),
            |sc| {
                assert_eq!(sc.invest(1u64), 1u64);
            },
        )
        .assert_ok();
    setup
        .blockchain_wrapper
        .execute_tx(
            &investor_b,
            &setup.contract_wrapper,
            &rust_biguint!(300),
            |sc| {
                assert_eq!(sc.invest(1u64), 2u64);
            },
        )
        .assert_ok();

    setup
        .blockchain_wrapper
        .execute_query(&setup.contract_wrapper, |sc| {
            let loan = sc.get_loan(1u64);
            assert_eq!(loan.status, LoanStatus::Funded);
            assert_eq!(loan.funded_amount, managed_biguint!(700));
            assert!(!sc.is_collateral_active(1u64));
        })
        .assert_ok();

    // O principal foi liberado ao produtor junto com a transição
    setup
        .blockchain_wrapper
        .check_egld_balance(&setup.farmer_a_address, &rust_biguint!(1_700));

    // Cenário C: quitação de 735 (700 + 5%) reativa a garantia
    setup
        .blockchain_wrapper
        .execute_tx(&farmer, &setup.contract_wrapper, &rust_biguint!(735), |sc| {
            sc.repay_loan(1u64);
        })
        .assert_ok();

    setup
        .blockchain_wrapper
        .execute_query(&setup.contract_wrapper, |sc| {
            assert_eq!(sc.get_loan_status(1u64), LoanStatus::Repaid);
            assert!(sc.is_collateral_active(1u64));
        })
        .assert_ok();

    // Cenário D: parcelas pro-rata — 420 para A, 315 para B, soma exata
    setup
        .blockchain_wrapper
        .execute_tx(
            &investor_a,
            &setup.contract_wrapper,
            &rust_biguint!(0),
            |sc| {
                sc.withdraw_investment(1u64, 1u64);
            },
        )
        .assert_ok();
    setup
        .blockchain_wrapper
        .execute_tx(
            &investor_b,
            &setup.contract_wrapper,
            &rust_biguint!(0),
            |sc| {
                sc.withdraw_investment(1u64, 2u64);
            },
        )
        .assert_ok();

    setup
        .blockchain_wrapper
        .check_egld_balance(&setup.investor_a_address, &rust_biguint!(10_020));
    setup
        .blockchain_wrapper
        .check_egld_balance(&setup.investor_b_address, &rust_biguint!(10_015));
    setup
        .blockchain_wrapper
        .check_egld_balance(setup.contract_wrapper.address_ref(), &rust_biguint!(0));

    // Cenário E: repetir a retirada falha e não paga de novo
    setup
        .blockchain_wrapper
        .execute_tx(
            &investor_a,
            &setup.contract_wrapper,
            &rust_biguint!(0),
            |sc| {
                sc.withdraw_investment(1u64, 1u64);
            },
        )
        .assert_user_error(ERR_ALREADY_WITHDRAWN);
    setup
        .blockchain_wrapper
        .check_egld_balance(&setup.investor_a_address, &rust_biguint!(10_020));

    // Cenário F: o empréstimo quitado não aceita investimento
    setup
        .blockchain_wrapper
        .execute_tx(
            &investor_b,
            &setup.contract_wrapper,
            &rust_biguint!(50),
            |sc| {
                sc.invest(1u64);
            },
        )
        .assert_user_error(ERR_LOAN_NOT_PENDING);
}

// Dois empréstimos de produtores diferentes mantêm contabilidade
// independente mesmo com um investidor em comum
#[test]
fn test_two_loans_independent_accounting() {
    let mut setup = setup_integrated_system(harvest_loan_controller::contract_obj);
    let farmer_a = setup.farmer_a_address.clone();
    let farmer_b = setup.farmer_b_address.clone();
    let investor_a = setup.investor_a_address.clone();
    let investor_b = setup.investor_b_address.clone();
    let verifier = setup.verifier_address.clone();

    // Produtor B precisa de nível 2 para pedir 1500
    setup
        .blockchain_wrapper
        .execute_tx(&verifier, &setup.contract_wrapper, &rust_biguint!(0), |sc| {
            sc.set_verification_level(
                managed_address!(&setup.farmer_b_address),
                2u8,
                managed_buffer!(b"coop-audit"),
            );
        })
        .assert_ok();

    setup
        .blockchain_wrapper
        .execute_tx(&farmer_a, &setup.contract_wrapper, &rust_biguint!(0), |sc| {
            let collateral_id = sc.register_collateral(
                managed_buffer!(b"soybean"),
                500u64,
                managed_biguint!(1_000),
                HARVEST_DATE,
                managed_buffer!(b"farm A"),
                100u64,
            );
            assert_eq!(
                sc.request_loan(collateral_id, managed_biguint!(700), 500u64, 90u64),
                1u64
            );
        })
        .assert_ok();

    setup
        .blockchain_wrapper
        .execute_tx(&farmer_b, &setup.contract_wrapper, &rust_biguint!(0), |sc| {
            let collateral_id = sc.register_collateral(
                managed_buffer!(b"coffee"),
                900u64,
                managed_biguint!(3_000),
                HARVEST_DATE,
                managed_buffer!(b"farm B"),
                80u64,
            );
            assert_eq!(
                sc.request_loan(collateral_id, managed_biguint!(1_500), 1_000u64, 120u64),
                2u64
            );
        })
        .assert_ok();

    // O mesmo investidor participa dos dois; as entradas não se misturam
    for (loan_id, amount) in [(1u64, 400u64), (2u64, 1_000u64)] {
        setup
            .blockchain_wrapper
            .execute_tx(
                &investor_a,
                &setup.contract_wrapper,
                &rust_biguint!(amount),
                |sc| {
                    assert_eq!(sc.invest(loan_id), 1u64);
                },
            )
            .assert_ok();
    }
    for (loan_id, amount) in [(1u64, 300u64), (2u64, 500u64)] {
        setup
            .blockchain_wrapper
            .execute_tx(
                &investor_b,
                &setup.contract_wrapper,
                &rust_biguint!(amount),
                |sc| {
                    assert_eq!(sc.invest(loan_id), 2u64);
                },
            )
            .assert_ok();
    }

    setup
        .blockchain_wrapper
        .execute_query(&setup.contract_wrapper, |sc| {
            assert_eq!(sc.get_loan_status(1u64), LoanStatus::Funded);
            assert_eq!(sc.get_loan_status(2u64), LoanStatus::Funded);
            assert_eq!(sc.get_loan(1u64).funded_amount, managed_biguint!(700));
            assert_eq!(sc.get_loan(2u64).funded_amount, managed_biguint!(1_500));
        })
        .assert_ok();

    // Quitação dos dois: 735 e 1650 (1500 + 10%)
    setup
        .blockchain_wrapper
        .execute_tx(&farmer_a, &setup.contract_wrapper, &rust_biguint!(735), |sc| {
            sc.repay_loan(1u64);
        })
        .assert_ok();
    setup
        .blockchain_wrapper
        .execute_tx(
            &farmer_b,
            &setup.contract_wrapper,
            &rust_biguint!(1_650),
            |sc| {
                sc.repay_loan(2u64);
            },
        )
        .assert_ok();

    // Retiradas por empréstimo e por entrada:
    // empréstimo 1: A = floor(400*735/700) = 420, B = floor(300*735/700) = 315
    // empréstimo 2: A = floor(1000*1650/1500) = 1100, B = floor(500*1650/1500) = 550
    for loan_id in [1u64, 2u64] {
        setup
            .blockchain_wrapper
            .execute_tx(
                &investor_a,
                &setup.contract_wrapper,
                &rust_biguint!(0),
                |sc| {
                    sc.withdraw_investment(loan_id, 1u64);
                },
            )
            .assert_ok();
        setup
            .blockchain_wrapper
            .execute_tx(
                &investor_b,
                &setup.contract_wrapper,
                &rust_biguint!(0),
                |sc| {
                    sc.withdraw_investment(loan_id, 2u64);
                },
            )
            .assert_ok();
    }

    // A: 10000 - 400 - 1000 + 420 + 1100 = 10120
    // B: 10000 - 300 - 500 + 315 + 550 = 10065
    setup
        .blockchain_wrapper
        .check_egld_balance(&setup.investor_a_address, &rust_biguint!(10_120));
    setup
        .blockchain_wrapper
        .check_egld_balance(&setup.investor_b_address, &rust_biguint!(10_065));
    setup
        .blockchain_wrapper
        .check_egld_balance(setup.contract_wrapper.address_ref(), &rust_biguint!(0));
}
