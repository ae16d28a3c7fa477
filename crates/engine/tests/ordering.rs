use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CompanyInput, Engine, EngineError, ItemFilter, ItemInput, MenuInput, ModifierInput, Money,
    OrderInput, OrderItemInput, PageRequest, Requester, RestaurantInput, Role, UpdateMode,
    UserInput,
};
use migration::MigratorTrait;

const STRONG_PASSWORD: &str = "test@134Pass";

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn user_input(username: &str, role: Role) -> UserInput {
    UserInput {
        username: Some(username.to_string()),
        password: Some(STRONG_PASSWORD.to_string()),
        user_type: Some(role.as_str().to_string()),
        phone_number: Some("01712345678".to_string()),
        address: Some("1 Main Street".to_string()),
        ..Default::default()
    }
}

/// Register a user and authenticate it through a fresh token.
async fn signed_in(engine: &Engine, username: &str, role: Role) -> Requester {
    engine.register(user_input(username, role)).await.unwrap();
    let key = engine
        .login(Some(username), Some(STRONG_PASSWORD))
        .await
        .unwrap();
    engine.authenticate(&key).await.unwrap()
}

async fn count_rows(db: &DatabaseConnection, table: &str, user_id: i32) -> i64 {
    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table} WHERE user_id = ?"),
            vec![user_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

fn assert_invalid<T: std::fmt::Debug>(result: Result<T, EngineError>, field: &str) {
    match result {
        Err(EngineError::Validation(errors)) => {
            assert!(errors.contains(field), "unexpected errors: {errors}");
        }
        other => panic!("expected a validation error on {field}, got {other:?}"),
    }
}

fn assert_forbidden<T: std::fmt::Debug>(result: Result<T, EngineError>) {
    assert!(
        matches!(result, Err(EngineError::Forbidden(_))),
        "expected forbidden, got {result:?}"
    );
}

async fn company(engine: &Engine, owner: &Requester, name: &str) -> i32 {
    engine
        .create_company(
            owner,
            CompanyInput {
                name: Some(name.to_string()),
                description: None,
            },
        )
        .await
        .unwrap()
        .id
}

async fn restaurant(engine: &Engine, owner: &Requester, company_id: i32, name: &str) -> i32 {
    engine
        .create_restaurant(
            owner,
            RestaurantInput {
                company: Some(company_id),
                name: Some(name.to_string()),
                phone_number: Some("01712345678".to_string()),
                address: Some("2 Harbour Road".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
}

async fn menu(engine: &Engine, requester: &Requester, restaurant_id: i32, name: &str) -> i32 {
    engine
        .create_menu(
            requester,
            MenuInput {
                restaurant: Some(restaurant_id),
                name: Some(name.to_string()),
                description: None,
            },
        )
        .await
        .unwrap()
        .id
}

async fn category(engine: &Engine, requester: &Requester, restaurant_id: i32, name: &str) -> i32 {
    engine
        .create_category(
            requester,
            engine::CategoryInput {
                restaurant: Some(restaurant_id),
                name: Some(name.to_string()),
                description: None,
            },
        )
        .await
        .unwrap()
        .id
}

fn item_input(menu_id: i32, category_id: i32, name: &str) -> ItemInput {
    ItemInput {
        menu: Some(menu_id),
        category: Some(category_id),
        name: Some(name.to_string()),
        price: Some("9.50".parse().unwrap()),
        ..Default::default()
    }
}

fn rename(name: &str) -> MenuInput {
    MenuInput {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn each_role_gets_exactly_its_profile() {
    let (engine, db) = engine_with_db().await;

    for (username, role) in [
        ("olivia", Role::Owner),
        ("ethan", Role::Employee),
        ("carla", Role::Customer),
    ] {
        let user = engine.register(user_input(username, role)).await.unwrap();
        assert_eq!(user.role().unwrap(), role);

        let expected = |table_role: Role| i64::from(table_role == role);
        assert_eq!(count_rows(&db, "owners", user.id).await, expected(Role::Owner));
        assert_eq!(
            count_rows(&db, "employees", user.id).await,
            expected(Role::Employee)
        );
        assert_eq!(
            count_rows(&db, "customers", user.id).await,
            expected(Role::Customer)
        );
    }
}

#[tokio::test]
async fn registration_reports_every_invalid_field() {
    let (engine, _db) = engine_with_db().await;

    let weak = UserInput {
        password: Some("test".to_string()),
        ..user_input("weak", Role::Customer)
    };
    assert_invalid(engine.register(weak).await, "password");

    let result = engine
        .register(UserInput {
            username: Some("bad".to_string()),
            password: Some("test".to_string()),
            user_type: Some("chef".to_string()),
            phone_number: Some("12".to_string()),
            ..Default::default()
        })
        .await;
    let Err(EngineError::Validation(errors)) = result else {
        panic!("expected a validation error, got {result:?}");
    };
    for field in ["password", "user_type", "phone_number", "address"] {
        assert!(errors.contains(field), "{field} missing from {errors}");
    }

    let user = engine
        .register(user_input("strong", Role::Customer))
        .await
        .unwrap();
    assert_ne!(user.password, STRONG_PASSWORD);
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register(user_input("mario", Role::Customer))
        .await
        .unwrap();
    assert_invalid(
        engine.register(user_input("mario", Role::Owner)).await,
        "username",
    );
}

#[tokio::test]
async fn login_reuses_token_and_logout_revokes_it() {
    let (engine, _db) = engine_with_db().await;
    let requester = signed_in(&engine, "luigi", Role::Customer).await;

    let first = engine
        .login(Some("luigi"), Some(STRONG_PASSWORD))
        .await
        .unwrap();
    let second = engine
        .login(Some("luigi"), Some(STRONG_PASSWORD))
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 40);

    let user = engine.authenticate(&first).await.unwrap().user;
    assert!(user.last_login.is_some());

    engine.logout(&requester).await.unwrap();
    assert_eq!(
        engine.authenticate(&first).await.unwrap_err(),
        EngineError::Unauthenticated
    );
    // Already gone: still fine.
    engine.logout(&requester).await.unwrap();

    assert_eq!(
        engine
            .login(Some("luigi"), Some("Wrong@123"))
            .await
            .unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert_invalid(engine.login(Some("luigi"), None).await, "non_field_errors");
}

#[tokio::test]
async fn inactive_account_cannot_authenticate() {
    let (engine, _db) = engine_with_db().await;
    let requester = signed_in(&engine, "peach", Role::Customer).await;
    let key = engine
        .login(Some("peach"), Some(STRONG_PASSWORD))
        .await
        .unwrap();

    engine.set_user_active(requester.id(), false).await.unwrap();

    assert_eq!(
        engine.authenticate(&key).await.unwrap_err(),
        EngineError::Unauthenticated
    );
    assert_eq!(
        engine
            .login(Some("peach"), Some(STRONG_PASSWORD))
            .await
            .unwrap_err(),
        EngineError::InactiveUser
    );
    assert_eq!(
        engine.authenticate("not-a-token").await.unwrap_err(),
        EngineError::Unauthenticated
    );
}

#[tokio::test]
async fn account_type_is_immutable() {
    let (engine, _db) = engine_with_db().await;
    let requester = signed_in(&engine, "toad", Role::Customer).await;

    let updated = engine
        .update_user(
            &requester,
            UserInput {
                address: Some("3 Castle Lane".to_string()),
                first_name: Some("Toad".to_string()),
                ..Default::default()
            },
            UpdateMode::Partial,
        )
        .await
        .unwrap();
    assert_eq!(updated.address, "3 Castle Lane");
    assert_eq!(updated.first_name, "Toad");

    assert_invalid(
        engine
            .update_user(
                &requester,
                UserInput {
                    user_type: Some("owner".to_string()),
                    ..Default::default()
                },
                UpdateMode::Partial,
            )
            .await,
        "user_type",
    );
}

#[tokio::test]
async fn companies_follow_owner_rules() {
    let (engine, _db) = engine_with_db().await;
    let creator = signed_in(&engine, "creator", Role::Owner).await;
    let other_owner = signed_in(&engine, "other", Role::Owner).await;
    let customer = signed_in(&engine, "guest", Role::Customer).await;

    let company_id = company(&engine, &creator, "Acme Foods").await;

    assert_invalid(
        engine
            .create_company(
                &other_owner,
                CompanyInput {
                    name: Some("Acme Foods".to_string()),
                    description: None,
                },
            )
            .await,
        "name",
    );
    assert_forbidden(
        engine
            .create_company(
                &customer,
                CompanyInput {
                    name: Some("Guest Co".to_string()),
                    description: None,
                },
            )
            .await,
    );

    // Any owner may update, not only the creator.
    let renamed = engine
        .update_company(
            &other_owner,
            company_id,
            CompanyInput {
                name: None,
                description: Some("Family business".to_string()),
            },
            UpdateMode::Partial,
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Acme Foods");
    assert_eq!(renamed.description.as_deref(), Some("Family business"));

    assert_forbidden(engine.company(&customer, company_id).await);
    assert_forbidden(engine.delete_company(&customer, company_id).await);

    let page = engine.companies(PageRequest::default()).await.unwrap();
    assert_eq!(page.count, 1);
}

#[tokio::test]
async fn restaurant_names_are_unique_and_owner_defaults_to_requester() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let company_id = company(&engine, &owner, "Acme Foods").await;

    let restaurant_id = restaurant(&engine, &owner, company_id, "ABC Diner").await;
    let created = engine.restaurant(&owner, restaurant_id).await.unwrap();
    assert_eq!(created.owner_id, owner.id());

    assert_invalid(
        engine
            .create_restaurant(
                &owner,
                RestaurantInput {
                    company: Some(company_id),
                    name: Some("ABC Diner".to_string()),
                    phone_number: Some("01712345678".to_string()),
                    address: Some("elsewhere".to_string()),
                    ..Default::default()
                },
            )
            .await,
        "name",
    );

    let customer = signed_in(&engine, "guest", Role::Customer).await;
    assert_invalid(
        engine
            .create_restaurant(
                &owner,
                RestaurantInput {
                    company: Some(company_id),
                    owner: Some(customer.id()),
                    name: Some("Guest Grill".to_string()),
                    phone_number: Some("01712345678".to_string()),
                    address: Some("elsewhere".to_string()),
                    ..Default::default()
                },
            )
            .await,
        "owner",
    );
}

#[tokio::test]
async fn employee_is_confined_to_its_restaurant() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let rival = signed_in(&engine, "rival", Role::Owner).await;
    let employee_user = signed_in(&engine, "waiter", Role::Employee).await;

    let company_id = company(&engine, &owner, "Acme Foods").await;
    let rival_company = company(&engine, &rival, "Rival Foods").await;
    let r1 = restaurant(&engine, &owner, company_id, "ABC Diner").await;
    let r2 = restaurant(&engine, &rival, rival_company, "Rival Grill").await;

    engine
        .assign_employee(&owner, r1, employee_user.id(), Some("Waiter"))
        .await
        .unwrap();
    let key = engine
        .login(Some("waiter"), Some(STRONG_PASSWORD))
        .await
        .unwrap();
    let employee = engine.authenticate(&key).await.unwrap();
    assert_eq!(employee.employee_restaurant_id, Some(r1));

    let m1 = menu(&engine, &owner, r1, "Lunch").await;
    let m2 = menu(&engine, &rival, r2, "Dinner").await;

    let visible = engine
        .menus(&employee, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(visible.count, 1);
    assert_eq!(visible.results[0].id, m1);

    let filtered = engine
        .menus(&employee, Some(r2), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(filtered.count, 0);
    assert!(filtered.results.is_empty());

    let updated = engine
        .update_menu(&employee, m1, rename("Brunch"), UpdateMode::Partial)
        .await
        .unwrap();
    assert_eq!(updated.name, "Brunch");
    assert_forbidden(
        engine
            .update_menu(&employee, m2, rename("Stolen"), UpdateMode::Partial)
            .await,
    );
    assert_forbidden(
        engine
            .create_menu(
                &employee,
                MenuInput {
                    restaurant: Some(r2),
                    name: Some("Sneaky".to_string()),
                    description: None,
                },
            )
            .await,
    );

    let staff = engine.restaurant_employees(&owner, r1).await.unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].1.designation, "Waiter");
    assert_forbidden(engine.restaurant_employees(&rival, r1).await);

    engine
        .unassign_employee(&owner, r1, employee_user.id())
        .await
        .unwrap();
    let unassigned = engine.authenticate(&key).await.unwrap();
    let none = engine
        .menus(&unassigned, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(none.count, 0);
}

#[tokio::test]
async fn other_owner_cannot_touch_menus() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let rival = signed_in(&engine, "rival", Role::Owner).await;
    let customer = signed_in(&engine, "guest", Role::Customer).await;

    let company_id = company(&engine, &owner, "Acme Foods").await;
    let r1 = restaurant(&engine, &owner, company_id, "ABC Diner").await;
    let m1 = menu(&engine, &owner, r1, "Lunch").await;

    assert_forbidden(
        engine
            .update_menu(&rival, m1, rename("Mine"), UpdateMode::Partial)
            .await,
    );
    assert_forbidden(engine.delete_menu(&rival, m1).await);

    // Reads are open to any authenticated user, lists are not.
    assert_eq!(engine.menu(&customer, m1).await.unwrap().name, "Lunch");
    let listed = engine
        .menus(&customer, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.count, 0);

    assert_invalid(
        engine
            .update_menu(
                &owner,
                m1,
                MenuInput {
                    restaurant: Some(r1),
                    name: None,
                    description: None,
                },
                UpdateMode::Replace,
            )
            .await,
        "name",
    );

    engine.delete_menu(&owner, m1).await.unwrap();
    assert!(matches!(
        engine.menu(&owner, m1).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn items_stay_within_one_restaurant() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let company_id = company(&engine, &owner, "Acme Foods").await;
    let r1 = restaurant(&engine, &owner, company_id, "ABC Diner").await;
    let r2 = restaurant(&engine, &owner, company_id, "Second Diner").await;

    let m1 = menu(&engine, &owner, r1, "Lunch").await;
    let c1 = category(&engine, &owner, r1, "Mains").await;
    let c2 = category(&engine, &owner, r2, "Desserts").await;

    assert_invalid(
        engine.create_item(&owner, item_input(m1, c2, "Pie")).await,
        "category",
    );

    let modifier = engine
        .create_modifier(
            &owner,
            ModifierInput {
                name: Some("Extra cheese".to_string()),
                price: Some(Money::from_cents(150).unwrap()),
                is_available: None,
            },
        )
        .await
        .unwrap();
    assert!(modifier.is_available);

    let item = engine
        .create_item(
            &owner,
            ItemInput {
                modifiers: Some(vec![modifier.id, modifier.id]),
                ..item_input(m1, c1, "Burger")
            },
        )
        .await
        .unwrap();
    assert_eq!(item.restaurant_id, r1);
    assert_eq!(item.modifiers, vec![modifier.id]);
    assert_eq!(item.price.to_string(), "9.50");

    let missing = uuid::Uuid::new_v4();
    assert_invalid(
        engine
            .update_item(
                &owner,
                item.id,
                ItemInput {
                    modifiers: Some(vec![missing]),
                    ..Default::default()
                },
                UpdateMode::Partial,
            )
            .await,
        "modifiers",
    );

    let by_menu = engine
        .items(
            &owner,
            ItemFilter {
                menu: Some(m1),
                category: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_menu.count, 1);
    assert_eq!(by_menu.results[0].modifiers, vec![modifier.id]);

    engine.delete_modifier(&owner, modifier.id).await.unwrap();
    assert!(engine.item(&owner, item.id).await.unwrap().modifiers.is_empty());
}

#[tokio::test]
async fn order_reference_is_generated_once() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let customer = signed_in(&engine, "guest", Role::Customer).await;
    let company_id = company(&engine, &owner, "Acme Foods").await;
    let r1 = restaurant(&engine, &owner, company_id, "ABC Diner").await;

    let order = engine
        .create_order(
            &customer,
            OrderInput {
                restaurant: Some(r1),
                address: Some("4 Elm Street".to_string()),
                total_amount: Some("25.00".parse().unwrap()),
                payment_method: Some("card".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(order.order_id.starts_with("ORD-AD-"), "{}", order.order_id);
    assert_eq!(order.client_id, customer.id());
    assert!(!order.is_paid);

    let paid = engine
        .update_order(
            order.id,
            OrderInput {
                is_paid: Some(true),
                ..Default::default()
            },
            UpdateMode::Partial,
        )
        .await
        .unwrap();
    assert!(paid.is_paid);
    assert_eq!(paid.order_id, order.order_id);

    assert_invalid(
        engine
            .create_order(
                &customer,
                OrderInput {
                    restaurant: Some(r1),
                    address: Some("4 Elm Street".to_string()),
                    total_amount: Some(Money::ZERO),
                    payment_method: Some("bitcoin".to_string()),
                    ..Default::default()
                },
            )
            .await,
        "payment_method",
    );
}

#[tokio::test]
async fn order_lines_validate_quantity_and_item() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let customer = signed_in(&engine, "guest", Role::Customer).await;
    let company_id = company(&engine, &owner, "Acme Foods").await;
    let r1 = restaurant(&engine, &owner, company_id, "ABC Diner").await;
    let r2 = restaurant(&engine, &owner, company_id, "Second Diner").await;

    let burger = engine
        .create_item(
            &owner,
            item_input(
                menu(&engine, &owner, r1, "Lunch").await,
                category(&engine, &owner, r1, "Mains").await,
                "Burger",
            ),
        )
        .await
        .unwrap();
    let pie = engine
        .create_item(
            &owner,
            item_input(
                menu(&engine, &owner, r2, "Dinner").await,
                category(&engine, &owner, r2, "Desserts").await,
                "Pie",
            ),
        )
        .await
        .unwrap();

    let order = engine
        .create_order(
            &customer,
            OrderInput {
                restaurant: Some(r1),
                address: Some("4 Elm Street".to_string()),
                total_amount: Some("19.00".parse().unwrap()),
                payment_method: Some("cash".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let line = |item: i32, quantity: i64| OrderItemInput {
        order: Some(order.id),
        item: Some(item),
        quantity: Some(quantity),
        price: Some(burger.price),
        modifiers: None,
    };

    assert_invalid(engine.create_order_item(line(burger.id, 0)).await, "quantity");
    assert_invalid(engine.create_order_item(line(burger.id, -2)).await, "quantity");
    assert_invalid(engine.create_order_item(line(pie.id, 1)).await, "item");

    let created = engine.create_order_item(line(burger.id, 2)).await.unwrap();
    assert_eq!(created.quantity, 2);

    let lines = engine
        .order_items(Some(order.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(lines.count, 1);

    engine.delete_order(order.id).await.unwrap();
    assert!(matches!(
        engine.order_item(created.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn deleting_a_company_removes_its_catalog() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let company_id = company(&engine, &owner, "Acme Foods").await;
    let r1 = restaurant(&engine, &owner, company_id, "ABC Diner").await;
    let m1 = menu(&engine, &owner, r1, "Lunch").await;

    engine.delete_company(&owner, company_id).await.unwrap();

    let restaurants = engine
        .restaurants(None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(restaurants.count, 0);
    assert!(matches!(
        engine.menu(&owner, m1).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn pages_past_the_end_are_empty() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    for name in ["One", "Two", "Three"] {
        company(&engine, &owner, name).await;
    }

    let page = PageRequest::new(Some(2), Some(2)).unwrap();
    let second = engine.companies(page).await.unwrap();
    assert_eq!(second.count, 3);
    assert_eq!(second.results.len(), 1);

    let beyond = PageRequest::new(Some(5), Some(2)).unwrap();
    let empty = engine.companies(beyond).await.unwrap();
    assert_eq!(empty.count, 3);
    assert!(empty.results.is_empty());
}

#[tokio::test]
async fn unknown_username_and_wrong_password_fail_alike() {
    let (engine, _db) = engine_with_db().await;
    signed_in(&engine, "mario", Role::Customer).await;

    let unknown = engine
        .login(Some("nobody"), Some(STRONG_PASSWORD))
        .await
        .unwrap_err();
    let wrong = engine
        .login(Some("mario"), Some("Wrong@123"))
        .await
        .unwrap_err();
    assert_eq!(unknown, EngineError::InvalidCredentials);
    assert_eq!(unknown, wrong);
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn categories_and_items_follow_list_scope() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let staff = signed_in(&engine, "waiter", Role::Employee).await;
    let idle = signed_in(&engine, "idle", Role::Employee).await;
    let customer = signed_in(&engine, "guest", Role::Customer).await;

    let company_id = company(&engine, &owner, "Acme Foods").await;
    let r1 = restaurant(&engine, &owner, company_id, "ABC Diner").await;
    let r2 = restaurant(&engine, &owner, company_id, "Second Diner").await;
    engine
        .assign_employee(&owner, r1, staff.id(), None)
        .await
        .unwrap();
    let key = engine
        .login(Some("waiter"), Some(STRONG_PASSWORD))
        .await
        .unwrap();
    let staff = engine.authenticate(&key).await.unwrap();

    let m1 = menu(&engine, &owner, r1, "Lunch").await;
    let m2 = menu(&engine, &owner, r2, "Dinner").await;
    let c1 = category(&engine, &owner, r1, "Mains").await;
    let c2 = category(&engine, &owner, r2, "Desserts").await;
    let i1 = engine
        .create_item(&owner, item_input(m1, c1, "Burger"))
        .await
        .unwrap()
        .id;
    engine
        .create_item(&owner, item_input(m2, c2, "Pie"))
        .await
        .unwrap();

    let categories = engine
        .categories(&owner, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(categories.count, 2);
    let items = engine
        .items(&owner, ItemFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(items.count, 2);

    let categories = engine
        .categories(&staff, None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(categories.count, 1);
    assert_eq!(categories.results[0].id, c1);
    let items = engine
        .items(&staff, ItemFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(items.count, 1);
    assert_eq!(items.results[0].id, i1);

    for requester in [&idle, &customer] {
        let categories = engine
            .categories(requester, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(categories.count, 0);
        assert!(categories.results.is_empty());
        let items = engine
            .items(requester, ItemFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(items.count, 0);
        assert!(items.results.is_empty());
    }
}

#[tokio::test]
async fn modifier_writes_need_creator_or_superuser() {
    let (engine, _db) = engine_with_db().await;
    let creator = signed_in(&engine, "owner", Role::Owner).await;
    let rival = signed_in(&engine, "rival", Role::Owner).await;
    engine
        .create_user(user_input("admin", Role::Owner), true)
        .await
        .unwrap();
    let key = engine
        .login(Some("admin"), Some(STRONG_PASSWORD))
        .await
        .unwrap();
    let admin = engine.authenticate(&key).await.unwrap();

    let modifier = engine
        .create_modifier(
            &creator,
            ModifierInput {
                name: Some("Extra cheese".to_string()),
                price: Some(Money::from_cents(150).unwrap()),
                is_available: None,
            },
        )
        .await
        .unwrap();
    let rename = |name: &str| ModifierInput {
        name: Some(name.to_string()),
        ..Default::default()
    };

    assert_forbidden(
        engine
            .update_modifier(&rival, modifier.id, rename("Stolen"), UpdateMode::Partial)
            .await,
    );
    assert_forbidden(engine.delete_modifier(&rival, modifier.id).await);

    let updated = engine
        .update_modifier(&admin, modifier.id, rename("Double cheese"), UpdateMode::Partial)
        .await
        .unwrap();
    assert_eq!(updated.name, "Double cheese");
    assert_eq!(updated.price, modifier.price);

    let updated = engine
        .update_modifier(&creator, modifier.id, rename("Cheese"), UpdateMode::Partial)
        .await
        .unwrap();
    assert_eq!(updated.name, "Cheese");
    engine.delete_modifier(&creator, modifier.id).await.unwrap();
}

#[tokio::test]
async fn missing_references_in_a_body_are_field_errors() {
    let (engine, _db) = engine_with_db().await;
    let owner = signed_in(&engine, "owner", Role::Owner).await;
    let company_id = company(&engine, &owner, "Acme Foods").await;
    let r1 = restaurant(&engine, &owner, company_id, "ABC Diner").await;
    let c1 = category(&engine, &owner, r1, "Mains").await;

    assert_invalid(
        engine
            .create_menu(
                &owner,
                MenuInput {
                    restaurant: Some(9999),
                    name: Some("Lunch".to_string()),
                    description: None,
                },
            )
            .await,
        "restaurant",
    );
    assert_invalid(
        engine.create_item(&owner, item_input(9999, c1, "Burger")).await,
        "menu",
    );
    assert!(matches!(
        engine.menu(&owner, 9999).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
