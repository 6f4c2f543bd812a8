//! # Mock Framework
//!
//! Utilities for testing clients without a running record store.
//!
//! Use [`create_mock_client`] to get a client and a receiver.
//! Then use helpers like [`expect_find`] or [`expect_commit`] to assert behavior.

use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Change, Entity, FrameworkError, Predicate, ResourceClient, ResourceRequest};

/// Creates a mock client and a receiver for asserting requests.
///
/// The client sends to a channel the test controls, so each request can be
/// inspected and answered by hand (success, failure, or a record of choice).
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Find request
pub async fn expect_find<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(Predicate<T>, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Find { predicate, respond_to }) => Some((predicate, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Commit request
pub async fn expect_commit<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(Vec<Change<T>>, oneshot::Sender<Result<(), FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Commit { changes, respond_to }) => Some((changes, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::app_system::SettlementMode;
    use crate::clients::{CustomerClient, SodaClient, TransactionClient};
    use crate::domain::{Customer, Soda};
    use crate::error::MachineError;

    fn transaction_client() -> (
        TransactionClient,
        mpsc::Receiver<ResourceRequest<Customer>>,
        mpsc::Receiver<ResourceRequest<Soda>>,
    ) {
        let (customers, customer_rx) = create_mock_client::<Customer>(10);
        let (sodas, soda_rx) = create_mock_client::<Soda>(10);
        let client = TransactionClient::new(
            CustomerClient::new(customers),
            SodaClient::new(sodas),
            Decimal::from(100),
            SettlementMode::Incremental,
        );
        (client, customer_rx, soda_rx)
    }

    #[tokio::test]
    async fn test_add_selection_is_one_delete_insert_commit() {
        let (client, mut customer_rx, _soda_rx) = transaction_client();
        let id = Uuid::new_v4();
        let customer = Customer::new(id, Decimal::from(40)).unwrap();
        let coke = Soda::new(Uuid::new_v4(), "Coke", 50, 5).unwrap();

        let task = tokio::spawn({
            let coke = coke.clone();
            async move { client.add_selection_to_customer(id, coke).await }
        });

        let (predicate, responder) = expect_find(&mut customer_rx).await.expect("Expected Customer Find");
        assert!(predicate(&customer));
        assert!(!predicate(&Customer::new(Uuid::new_v4(), Decimal::ZERO).unwrap()));
        responder.send(Ok(Some(customer.clone()))).unwrap();

        let (changes, responder) = expect_commit(&mut customer_rx).await.expect("Expected Customer Commit");
        assert_eq!(changes.len(), 2);
        match (&changes[0], &changes[1]) {
            (Change::Delete(deleted), Change::Insert(inserted)) => {
                assert_eq!(*deleted, id);
                assert_eq!(inserted.id(), id);
                assert_eq!(inserted.balance(), Decimal::from(40));
                assert_eq!(inserted.selections(), &[coke.clone()]);
            }
            other => panic!("Unexpected changes: {:?}", other),
        }
        responder.send(Ok(())).unwrap();

        let updated = task.await.unwrap().unwrap();
        assert_eq!(updated.selections().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_store_error() {
        let (client, mut customer_rx, _soda_rx) = transaction_client();
        let id = Uuid::new_v4();
        let customer = Customer::new(id, Decimal::from(40)).unwrap();
        let coke = Soda::new(Uuid::new_v4(), "Coke", 50, 5).unwrap();

        let task = tokio::spawn(async move { client.add_selection_to_customer(id, coke).await });

        let (_, responder) = expect_find(&mut customer_rx).await.expect("Expected Customer Find");
        responder.send(Ok(Some(customer))).unwrap();
        let (_, responder) = expect_commit(&mut customer_rx).await.expect("Expected Customer Commit");
        let conflict = FrameworkError::Conflict { kind: "customer", id: id.to_string() };
        responder.send(Err(conflict.clone())).unwrap();

        assert_eq!(task.await.unwrap(), Err(MachineError::Store(conflict)));
    }

    #[tokio::test]
    async fn test_get_balance_reads_by_id() {
        let (client, mut customer_rx, _soda_rx) = transaction_client();
        let id = Uuid::new_v4();

        let task = tokio::spawn(async move { client.get_balance(id).await });

        let (requested, responder) = expect_get(&mut customer_rx).await.expect("Expected Customer Get");
        assert_eq!(requested, id);
        responder.send(Ok(None)).unwrap();

        assert_eq!(task.await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_failed_cursor_write_restores_stock() {
        let (client, mut customer_rx, mut soda_rx) = transaction_client();
        let id = Uuid::new_v4();
        let mut customer = Customer::new(id, Decimal::from(40)).unwrap();
        let coke = Soda::new(Uuid::new_v4(), "Coke", 50, 5).unwrap();
        customer.add_selection(coke.clone());

        let task = tokio::spawn({
            let coke = coke.clone();
            async move { client.adjust_inventory(id, &coke).await }
        });

        let (_, responder) = expect_find(&mut customer_rx).await.expect("Expected Customer Find");
        responder.send(Ok(Some(customer))).unwrap();
        let (_, responder) = expect_find(&mut soda_rx).await.expect("Expected Soda Find");
        responder.send(Ok(Some(coke.clone()))).unwrap();

        let (changes, responder) = expect_commit(&mut soda_rx).await.expect("Expected Soda Commit");
        assert!(matches!(&changes[1], Change::Insert(s) if s.quantity() == 49));
        responder.send(Ok(())).unwrap();

        let (_, responder) = expect_commit(&mut customer_rx).await.expect("Expected Customer Commit");
        let conflict = FrameworkError::Conflict { kind: "customer", id: id.to_string() };
        responder.send(Err(conflict.clone())).unwrap();

        let (changes, responder) = expect_commit(&mut soda_rx).await.expect("Expected Soda restore");
        assert_eq!(changes.len(), 2);
        assert!(matches!(&changes[0], Change::Delete(deleted) if *deleted == coke.id()));
        assert!(matches!(&changes[1], Change::Insert(s) if s.quantity() == 50));
        responder.send(Ok(())).unwrap();

        assert_eq!(task.await.unwrap(), Err(MachineError::Store(conflict)));
    }

    #[tokio::test]
    async fn test_out_of_stock_writes_nothing() {
        let (client, mut customer_rx, mut soda_rx) = transaction_client();
        let id = Uuid::new_v4();
        let mut customer = Customer::new(id, Decimal::from(40)).unwrap();
        let sprite = Soda::new(Uuid::new_v4(), "Sprite", 1, 3).unwrap();
        customer.add_selection(sprite.clone());
        customer.add_selection(sprite.clone());

        let task = tokio::spawn({
            let sprite = sprite.clone();
            async move { client.adjust_inventory(id, &sprite).await }
        });

        let (_, responder) = expect_find(&mut customer_rx).await.expect("Expected Customer Find");
        responder.send(Ok(Some(customer))).unwrap();
        let (_, responder) = expect_find(&mut soda_rx).await.expect("Expected Soda Find");
        responder.send(Ok(Some(sprite))).unwrap();

        assert_eq!(task.await.unwrap(), Err(MachineError::OutOfStock));
        // The client was dropped with the task; no commit ever reached either store.
        assert!(soda_rx.recv().await.is_none());
        assert!(customer_rx.recv().await.is_none());
    }
}
