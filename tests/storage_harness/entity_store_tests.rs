//! Macro-generated test suite for `EntityStore` contract validation.
//!
//! The `entity_store_tests!` macro generates a test module that validates any
//! `EntityStore` implementation against the full contract: customer CRUD,
//! uniqueness, ownership, cascade deletion and atomicity of failed calls.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use orderdesk::storage::InMemoryStore;
//!
//! entity_store_tests!(InMemoryStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Customers
//! - `test_create_and_get` - create then retrieve, all fields equal
//! - `test_get_nonexistent` - unknown id is `NotFound`
//! - `test_list_ascending` - list returns customers by ascending id
//! - `test_duplicate_email_conflict` - second create fails, store unchanged
//! - `test_concurrent_duplicate_email` - exactly one of two racing creates wins
//! - `test_patch_changes_only_supplied_fields`
//! - `test_patch_to_taken_email_conflict` / `test_patch_own_email_allowed`
//! - `test_replace_*` - full overwrite, `NotFound`, `Conflict`
//! - `test_delete_cascades_orders` - N owned orders removed, others kept
//! - `test_ids_not_reused`
//!
//! ## Orders
//! - `test_create_order_missing_owner` - `NotFound`, no order stored
//! - `test_duplicate_order_number_conflict`
//! - `test_concurrent_duplicate_order_number` - one of two racing creates wins
//! - `test_concurrent_distinct_orders` / `test_concurrent_patches` - all succeed
//! - `test_get_order_with_owner`, `test_delete_order`, `test_list_customer_orders`

/// Generate a full `EntityStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to an empty, `Clone`
/// store implementing `EntityStore`. It is re-evaluated for each test to ensure
/// isolation and may contain `.await`.
#[macro_export]
macro_rules! entity_store_tests {
    ($factory:expr) => {
        mod entity_store_contract_tests {
            use super::*;
            use orderdesk::core::model::{CustomerPatch, NewCustomer, NewOrder};
            use orderdesk::core::service::EntityStore;

            async fn make_store() -> impl EntityStore + Clone + 'static {
                $factory
            }

            // ==================================================================
            // Customers - Create & Get
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = make_store().await;

                let created = store.create_customer(jane()).await.unwrap();
                assert!(created.id > 0);
                assert_eq!(created.name, "Jane Doe");
                assert_eq!(created.email, "jane@mail.com");
                assert_eq!(created.customer_since, 2015);

                let fetched = store.get_customer(created.id).await.unwrap();
                assert_eq!(fetched, created);
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = make_store().await;
                let err = store.get_customer(999).await.unwrap_err();
                assert!(err.is_not_found(), "expected NotFound, got {err}");
            }

            #[tokio::test]
            async fn test_list_empty() {
                let store = make_store().await;
                assert!(store.list_customers().await.unwrap().is_empty());
                assert!(store.list_orders().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_list_ascending() {
                let store = make_store().await;
                for n in 0..5 {
                    store.create_customer(customer(n)).await.unwrap();
                }

                let listed = store.list_customers().await.unwrap();
                assert_eq!(listed.len(), 5);
                assert!(listed.windows(2).all(|w| w[0].id < w[1].id));
                assert_eq!(listed[0].email, "customer0@mail.com");
                assert_eq!(listed[4].email, "customer4@mail.com");
            }

            #[tokio::test]
            async fn test_ids_not_reused() {
                let store = make_store().await;
                let first = store.create_customer(customer(1)).await.unwrap();
                store.delete_customer(first.id).await.unwrap();
                let second = store.create_customer(customer(2)).await.unwrap();
                assert!(second.id > first.id);
            }

            // ==================================================================
            // Customers - Uniqueness
            // ==================================================================

            #[tokio::test]
            async fn test_duplicate_email_conflict() {
                let store = make_store().await;
                let original = store.create_customer(jane()).await.unwrap();

                let err = store
                    .create_customer(NewCustomer::new("Other", "jane@mail.com", 2020))
                    .await
                    .unwrap_err();
                assert!(err.is_conflict(), "expected Conflict, got {err}");

                let listed = store.list_customers().await.unwrap();
                assert_eq!(listed, vec![original]);
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_duplicate_email() {
                crate::storage_harness::races::duplicate_email(make_store().await).await;
            }

            // ==================================================================
            // Customers - Patch
            // ==================================================================

            #[tokio::test]
            async fn test_patch_changes_only_supplied_fields() {
                let store = make_store().await;
                let created = store.create_customer(jane()).await.unwrap();

                let patched = store
                    .patch_customer(created.id, CustomerPatch::default().with_email("jane@new.com"))
                    .await
                    .unwrap();
                assert_eq!(patched.id, created.id);
                assert_eq!(patched.email, "jane@new.com");
                assert_eq!(patched.name, created.name);
                assert_eq!(patched.customer_since, created.customer_since);

                assert_eq!(store.get_customer(created.id).await.unwrap(), patched);
            }

            #[tokio::test]
            async fn test_patch_empty_is_noop() {
                let store = make_store().await;
                let created = store.create_customer(jane()).await.unwrap();
                let patched = store
                    .patch_customer(created.id, CustomerPatch::default())
                    .await
                    .unwrap();
                assert_eq!(patched, created);
            }

            #[tokio::test]
            async fn test_patch_to_taken_email_conflict() {
                let store = make_store().await;
                let jane = store.create_customer(jane()).await.unwrap();
                let other = store.create_customer(customer(1)).await.unwrap();

                let err = store
                    .patch_customer(
                        other.id,
                        CustomerPatch::default()
                            .with_name("Renamed")
                            .with_email(jane.email.clone()),
                    )
                    .await
                    .unwrap_err();
                assert!(err.is_conflict(), "expected Conflict, got {err}");

                // nothing from the failed patch is visible
                assert_eq!(store.get_customer(other.id).await.unwrap(), other);
            }

            #[tokio::test]
            async fn test_patch_own_email_allowed() {
                let store = make_store().await;
                let created = store.create_customer(jane()).await.unwrap();
                let patched = store
                    .patch_customer(
                        created.id,
                        CustomerPatch::default()
                            .with_email("jane@mail.com")
                            .with_customer_since(2016),
                    )
                    .await
                    .unwrap();
                assert_eq!(patched.customer_since, 2016);
            }

            #[tokio::test]
            async fn test_patch_nonexistent() {
                let store = make_store().await;
                let err = store
                    .patch_customer(42, CustomerPatch::default().with_name("Ghost"))
                    .await
                    .unwrap_err();
                assert!(err.is_not_found(), "expected NotFound, got {err}");
                assert!(store.list_customers().await.unwrap().is_empty());
            }

            // ==================================================================
            // Customers - Replace
            // ==================================================================

            #[tokio::test]
            async fn test_replace_overwrites_all_fields() {
                let store = make_store().await;
                let created = store.create_customer(jane()).await.unwrap();

                let replaced = store
                    .replace_customer(created.id, NewCustomer::new("Janet", "janet@mail.com", 2001))
                    .await
                    .unwrap();
                assert_eq!(replaced.id, created.id);
                assert_eq!(replaced.name, "Janet");
                assert_eq!(replaced.email, "janet@mail.com");
                assert_eq!(replaced.customer_since, 2001);
                assert_eq!(store.get_customer(created.id).await.unwrap(), replaced);
            }

            #[tokio::test]
            async fn test_replace_nonexistent() {
                let store = make_store().await;
                let err = store.replace_customer(7, jane()).await.unwrap_err();
                assert!(err.is_not_found(), "expected NotFound, got {err}");
                assert!(store.list_customers().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_replace_to_taken_email_conflict() {
                let store = make_store().await;
                store.create_customer(jane()).await.unwrap();
                let other = store.create_customer(customer(1)).await.unwrap();

                let err = store
                    .replace_customer(other.id, NewCustomer::new("X", "jane@mail.com", 2020))
                    .await
                    .unwrap_err();
                assert!(err.is_conflict(), "expected Conflict, got {err}");
                assert_eq!(store.get_customer(other.id).await.unwrap(), other);
            }

            // ==================================================================
            // Customers - Delete
            // ==================================================================

            #[tokio::test]
            async fn test_delete_cascades_orders() {
                let store = make_store().await;
                let owner = store.create_customer(jane()).await.unwrap();
                let bystander = store.create_customer(customer(1)).await.unwrap();

                for n in 0..4 {
                    store.create_order(order(n, owner.id)).await.unwrap();
                }
                let kept = store.create_order(order(100, bystander.id)).await.unwrap();

                store.delete_customer(owner.id).await.unwrap();

                let err = store.get_customer(owner.id).await.unwrap_err();
                assert!(err.is_not_found());
                assert_eq!(store.list_orders().await.unwrap(), vec![kept]);
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let store = make_store().await;
                let survivor = store.create_customer(jane()).await.unwrap();

                let err = store.delete_customer(survivor.id + 1).await.unwrap_err();
                assert!(err.is_not_found(), "expected NotFound, got {err}");
                assert_eq!(store.list_customers().await.unwrap(), vec![survivor]);
            }

            #[tokio::test]
            async fn test_delete_frees_email() {
                let store = make_store().await;
                let created = store.create_customer(jane()).await.unwrap();
                store.delete_customer(created.id).await.unwrap();
                assert!(store.create_customer(jane()).await.is_ok());
            }

            // ==================================================================
            // Orders
            // ==================================================================

            #[tokio::test]
            async fn test_create_order() {
                let store = make_store().await;
                let owner = store.create_customer(jane()).await.unwrap();

                let created = store
                    .create_order(NewOrder::new("ORD-1", 2_500, owner.id))
                    .await
                    .unwrap();
                assert!(created.id > 0);
                assert_eq!(created.order_number, "ORD-1");
                assert_eq!(created.total_cents, 2_500);
                assert_eq!(created.owner_id, owner.id);
            }

            #[tokio::test]
            async fn test_create_order_missing_owner() {
                let store = make_store().await;
                let owner = store.create_customer(jane()).await.unwrap();
                store.create_order(order(1, owner.id)).await.unwrap();
                let before = store.list_orders().await.unwrap();

                let err = store
                    .create_order(NewOrder::new("ORD-404", 100, owner.id + 1000))
                    .await
                    .unwrap_err();
                assert!(err.is_not_found(), "expected NotFound, got {err}");
                assert_eq!(store.list_orders().await.unwrap(), before);
            }

            #[tokio::test]
            async fn test_duplicate_order_number_conflict() {
                let store = make_store().await;
                let a = store.create_customer(jane()).await.unwrap();
                let b = store.create_customer(customer(1)).await.unwrap();
                store
                    .create_order(NewOrder::new("ORD-1", 100, a.id))
                    .await
                    .unwrap();

                // unique across owners, not per owner
                let err = store
                    .create_order(NewOrder::new("ORD-1", 200, b.id))
                    .await
                    .unwrap_err();
                assert!(err.is_conflict(), "expected Conflict, got {err}");
                assert_eq!(store.list_orders().await.unwrap().len(), 1);
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_duplicate_order_number() {
                crate::storage_harness::races::duplicate_order_number(make_store().await).await;
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_distinct_orders() {
                crate::storage_harness::races::distinct_orders(make_store().await).await;
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_patches() {
                crate::storage_harness::races::patches(make_store().await).await;
            }

            #[tokio::test]
            async fn test_list_orders_ascending() {
                let store = make_store().await;
                let owner = store.create_customer(jane()).await.unwrap();
                for n in 0..3 {
                    store.create_order(order(n, owner.id)).await.unwrap();
                }

                let listed = store.list_orders().await.unwrap();
                assert_eq!(listed.len(), 3);
                assert!(listed.windows(2).all(|w| w[0].id < w[1].id));
            }

            #[tokio::test]
            async fn test_get_order_with_owner() {
                let store = make_store().await;
                let owner = store.create_customer(jane()).await.unwrap();
                let created = store.create_order(order(1, owner.id)).await.unwrap();

                let fetched = store.get_order_with_owner(created.id).await.unwrap();
                assert_eq!(fetched.order, created);
                assert_eq!(fetched.owner, owner);

                let err = store.get_order_with_owner(created.id + 1).await.unwrap_err();
                assert!(err.is_not_found(), "expected NotFound, got {err}");
            }

            #[tokio::test]
            async fn test_owner_changes_visible_through_order() {
                let store = make_store().await;
                let owner = store.create_customer(jane()).await.unwrap();
                let created = store.create_order(order(1, owner.id)).await.unwrap();
                store
                    .patch_customer(owner.id, CustomerPatch::default().with_name("Jane Roe"))
                    .await
                    .unwrap();

                let fetched = store.get_order_with_owner(created.id).await.unwrap();
                assert_eq!(fetched.owner.name, "Jane Roe");
            }

            #[tokio::test]
            async fn test_delete_order() {
                let store = make_store().await;
                let owner = store.create_customer(jane()).await.unwrap();
                let first = store.create_order(order(1, owner.id)).await.unwrap();
                let second = store.create_order(order(2, owner.id)).await.unwrap();

                store.delete_order(first.id).await.unwrap();

                assert!(store.get_order_with_owner(first.id).await.unwrap_err().is_not_found());
                assert!(store.delete_order(first.id).await.unwrap_err().is_not_found());
                assert_eq!(store.list_orders().await.unwrap(), vec![second]);
                // the owner is untouched
                assert_eq!(store.get_customer(owner.id).await.unwrap(), owner);
            }

            #[tokio::test]
            async fn test_list_customer_orders() {
                let store = make_store().await;
                let a = store.create_customer(jane()).await.unwrap();
                let b = store.create_customer(customer(1)).await.unwrap();
                let a1 = store.create_order(order(1, a.id)).await.unwrap();
                store.create_order(order(2, b.id)).await.unwrap();
                let a2 = store.create_order(order(3, a.id)).await.unwrap();

                assert_eq!(store.list_customer_orders(a.id).await.unwrap(), vec![a1, a2]);

                let err = store.list_customer_orders(b.id + 100).await.unwrap_err();
                assert!(err.is_not_found(), "expected NotFound, got {err}");
            }
        }
    };
}
