//! Loading the contract from a file, as `--contract` does.

use std::io::Write;

use portico::prelude::{Contract, ContractError};

#[test]
fn contract_loads_from_a_file_on_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(hello_api::CONTRACT_BYTES).unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    let contract = Contract::from_slice(&bytes).unwrap();
    assert_eq!(contract.name(), "hello-api");
    assert_eq!(contract.operations().len(), 2);
}

#[test]
fn corrupt_contract_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ \"name\": \"broken\"").unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert!(matches!(
        Contract::from_slice(&bytes).unwrap_err(),
        ContractError::Parse(_)
    ));
}

#[test]
fn inconsistent_contract_file_is_rejected() {
    let doc = br#"{
        "name": "broken",
        "operations": [
            { "operationId": "greet", "method": "GET", "path": "/hello/{user}" }
        ]
    }"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(doc).unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert!(matches!(
        Contract::from_slice(&bytes).unwrap_err(),
        ContractError::UndeclaredParameter { .. }
    ));
}
