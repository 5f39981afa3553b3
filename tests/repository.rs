use naxos_menu::domain::category::{NewCategory, UpdateCategory};
use naxos_menu::domain::menu_item::{
    CategoryFilter, MenuItemListQuery, NewMenuItem, UpdateMenuItem,
};
use naxos_menu::repository::{
    CategoryReader, CategoryWriter, DieselRepository, MenuItemReader, MenuItemWriter,
    RepositoryError,
};

mod common;

#[test]
fn test_category_repository_crud() {
    let test_db = common::TestDb::new("test_category_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());

    let starters = repo.create_category(&NewCategory::new("Starters")).unwrap();
    let mains = repo.create_category(&NewCategory::new("Mains")).unwrap();
    let desserts = repo
        .create_category(&NewCategory::new("Desserts").with_sequence(10))
        .unwrap();

    assert_eq!(starters.sequence, 0);
    assert_eq!(mains.sequence, 1);
    assert_eq!(desserts.sequence, 10);

    let drinks = repo.create_category(&NewCategory::new("Drinks")).unwrap();
    assert_eq!(drinks.sequence, 11);

    let renamed = repo
        .update_category(mains.id, &UpdateCategory::new("Grill", None))
        .unwrap();
    assert_eq!(renamed.name, "Grill");
    assert_eq!(renamed.sequence, 1);

    let fetched = repo.get_category_by_id(mains.id).unwrap().unwrap();
    assert_eq!(fetched.name, "Grill");

    let names: Vec<String> = repo
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Starters", "Grill", "Desserts", "Drinks"]);

    repo.delete_category(drinks.id).unwrap();
    assert!(repo.get_category_by_id(drinks.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_category(drinks.id),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repo.update_category(drinks.id, &UpdateCategory::new("Gone", None)),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_category_names_are_unique() {
    let test_db = common::TestDb::new("test_category_names_are_unique.db");
    let repo = DieselRepository::new(test_db.pool());

    repo.create_category(&NewCategory::new("Starters")).unwrap();
    let err = repo
        .create_category(&NewCategory::new("Starters"))
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[test]
fn test_reorder_categories() {
    let test_db = common::TestDb::new("test_reorder_categories.db");
    let repo = DieselRepository::new(test_db.pool());

    let c1 = repo.create_category(&NewCategory::new("One")).unwrap();
    let c2 = repo.create_category(&NewCategory::new("Two")).unwrap();
    let c3 = repo.create_category(&NewCategory::new("Three")).unwrap();

    repo.reorder_categories(&[c3.id, c1.id, c2.id]).unwrap();

    let ordered: Vec<(i32, i32)> = repo
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|category| (category.id, category.sequence))
        .collect();
    assert_eq!(ordered, vec![(c3.id, 0), (c1.id, 1), (c2.id, 2)]);
}

#[test]
fn test_reorder_rolls_back_on_unknown_id() {
    let test_db = common::TestDb::new("test_reorder_rolls_back_on_unknown_id.db");
    let repo = DieselRepository::new(test_db.pool());

    let c1 = repo.create_category(&NewCategory::new("One")).unwrap();
    let c2 = repo.create_category(&NewCategory::new("Two")).unwrap();

    let err = repo.reorder_categories(&[c2.id, c1.id, 999]).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    let ordered: Vec<(i32, i32)> = repo
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|category| (category.id, category.sequence))
        .collect();
    assert_eq!(ordered, vec![(c1.id, 0), (c2.id, 1)]);

    let err = repo.reorder_categories(&[c1.id, c1.id]).unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[test]
fn test_menu_item_repository_crud() {
    let test_db = common::TestDb::new("test_menu_item_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());

    let starters = repo.create_category(&NewCategory::new("Starters")).unwrap();

    let created = repo
        .create_menu_item(
            &NewMenuItem::new("Tzatziki", 495)
                .with_description("Yoghurt, cucumber and garlic")
                .with_image_url("https://res.cloudinary.com/demo/tzatziki.jpg")
                .with_category_id(starters.id)
                .featured(true),
        )
        .unwrap();

    assert_eq!(created.title, "Tzatziki");
    assert_eq!(created.price_cents, 495);
    assert_eq!(created.category_id, Some(starters.id));
    assert!(created.is_featured);
    assert_eq!(created.sequence, 0);

    let fetched = repo.get_menu_item_by_id(created.id).unwrap().unwrap();
    assert_eq!(fetched, created);

    let mut update = UpdateMenuItem::new("Tzatziki & pitta", 550);
    update.category_id = Some(starters.id);
    let updated = repo.update_menu_item(created.id, &update).unwrap();
    assert_eq!(updated.title, "Tzatziki & pitta");
    assert_eq!(updated.price_cents, 550);
    assert_eq!(updated.description, None);
    assert_eq!(updated.image_url, None);
    assert!(!updated.is_featured);
    assert_eq!(updated.sequence, 0);

    repo.delete_menu_item(created.id).unwrap();
    assert!(repo.get_menu_item_by_id(created.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_menu_item(created.id),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_menu_item_sequence_is_per_category() {
    let test_db = common::TestDb::new("test_menu_item_sequence_is_per_category.db");
    let repo = DieselRepository::new(test_db.pool());

    let starters = repo.create_category(&NewCategory::new("Starters")).unwrap();
    let mains = repo.create_category(&NewCategory::new("Mains")).unwrap();

    let a = repo
        .create_menu_item(&NewMenuItem::new("Olives", 350).with_category_id(starters.id))
        .unwrap();
    let b = repo
        .create_menu_item(&NewMenuItem::new("Feta", 450).with_category_id(starters.id))
        .unwrap();
    let c = repo
        .create_menu_item(&NewMenuItem::new("Moussaka", 1450).with_category_id(mains.id))
        .unwrap();
    let d = repo
        .create_menu_item(&NewMenuItem::new("Bread", 200))
        .unwrap();

    assert_eq!((a.sequence, b.sequence), (0, 1));
    assert_eq!(c.sequence, 0);
    assert_eq!(d.sequence, 0);
}

#[test]
fn test_list_menu_items_filters() {
    let test_db = common::TestDb::new("test_list_menu_items_filters.db");
    let repo = DieselRepository::new(test_db.pool());

    let starters = repo.create_category(&NewCategory::new("Starters")).unwrap();
    repo.create_menu_item(
        &NewMenuItem::new("Halloumi", 650)
            .with_category_id(starters.id)
            .featured(true),
    )
    .unwrap();
    repo.create_menu_item(
        &NewMenuItem::new("Dolmades", 550)
            .with_description("Vine leaves stuffed with rice")
            .with_category_id(starters.id),
    )
    .unwrap();
    repo.create_menu_item(&NewMenuItem::new("Baklava", 500))
        .unwrap();

    let all = repo.list_menu_items(MenuItemListQuery::new()).unwrap();
    assert_eq!(all.len(), 3);

    let in_starters = repo
        .list_menu_items(MenuItemListQuery::new().category(CategoryFilter::Id(starters.id)))
        .unwrap();
    assert_eq!(in_starters.len(), 2);

    let uncategorized = repo
        .list_menu_items(MenuItemListQuery::new().category(CategoryFilter::Uncategorized))
        .unwrap();
    assert_eq!(uncategorized.len(), 1);
    assert_eq!(uncategorized[0].title, "Baklava");

    let featured = repo
        .list_menu_items(MenuItemListQuery::new().featured())
        .unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].title, "Halloumi");

    let by_description = repo
        .list_menu_items(MenuItemListQuery::new().search("rice"))
        .unwrap();
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0].title, "Dolmades");
}

#[test]
fn test_deleting_category_leaves_items_uncategorized() {
    let test_db = common::TestDb::new("test_deleting_category_leaves_items_uncategorized.db");
    let repo = DieselRepository::new(test_db.pool());

    let specials = repo.create_category(&NewCategory::new("Specials")).unwrap();
    let item = repo
        .create_menu_item(&NewMenuItem::new("Kleftiko", 1650).with_category_id(specials.id))
        .unwrap();

    repo.delete_category(specials.id).unwrap();

    let fetched = repo.get_menu_item_by_id(item.id).unwrap().unwrap();
    assert_eq!(fetched.category_id, None);

    let uncategorized = repo
        .list_menu_items(MenuItemListQuery::new().category(CategoryFilter::Uncategorized))
        .unwrap();
    assert_eq!(uncategorized.len(), 1);
    assert_eq!(uncategorized[0].id, item.id);

    let in_deleted = repo
        .list_menu_items(MenuItemListQuery::new().category(CategoryFilter::Id(specials.id)))
        .unwrap();
    assert!(in_deleted.is_empty());
}

#[test]
fn test_uncategorized_sequence_counts_items_of_deleted_categories() {
    let test_db =
        common::TestDb::new("test_uncategorized_sequence_counts_items_of_deleted_categories.db");
    let repo = test_db.repo();

    let specials = repo.create_category(&NewCategory::new("Specials")).unwrap();
    for title in ["Kleftiko", "Stifado", "Gemista"] {
        repo.create_menu_item(&NewMenuItem::new(title, 1500).with_category_id(specials.id))
            .unwrap();
    }
    repo.delete_category(specials.id).unwrap();

    let added = repo
        .create_menu_item(&NewMenuItem::new("Loukoumades", 600))
        .unwrap();
    assert_eq!(added.sequence, 3);

    let uncategorized: Vec<(String, i32)> = repo
        .list_menu_items(MenuItemListQuery::new().category(CategoryFilter::Uncategorized))
        .unwrap()
        .into_iter()
        .map(|item| (item.title, item.sequence))
        .collect();
    assert_eq!(
        uncategorized,
        vec![
            ("Kleftiko".to_string(), 0),
            ("Stifado".to_string(), 1),
            ("Gemista".to_string(), 2),
            ("Loukoumades".to_string(), 3),
        ]
    );
}

#[test]
fn test_reorder_menu_items() {
    let test_db = common::TestDb::new("test_reorder_menu_items.db");
    let repo = DieselRepository::new(test_db.pool());

    let mains = repo.create_category(&NewCategory::new("Mains")).unwrap();
    let ids: Vec<i32> = ["Souvlaki", "Gyros", "Stifado"]
        .into_iter()
        .map(|title| {
            repo.create_menu_item(&NewMenuItem::new(title, 1200).with_category_id(mains.id))
                .unwrap()
                .id
        })
        .collect();

    repo.reorder_menu_items(&[ids[2], ids[0], ids[1]]).unwrap();

    let titles: Vec<String> = repo
        .list_menu_items(MenuItemListQuery::new().category(CategoryFilter::Id(mains.id)))
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["Stifado", "Souvlaki", "Gyros"]);

    let err = repo.reorder_menu_items(&[ids[0], 999]).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    let first = repo.get_menu_item_by_id(ids[0]).unwrap().unwrap();
    assert_eq!(first.sequence, 1);
}
