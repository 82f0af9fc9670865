use std::{collections::BTreeSet, str::FromStr};

use cookbook_recipe::{
    Command, RecipeFilter, RecipeInput, RecipePatch, TaxonomyInput, TaxonomyKind, parse_ids,
};
use cookbook_shared::Error;
use rust_decimal::Decimal;
use temp_dir::TempDir;

mod helpers;

fn sample(title: &str) -> RecipeInput {
    RecipeInput {
        title: title.to_owned(),
        time_minutes: Some(10),
        price: Some(Decimal::from_str("5.00").unwrap()),
        ..Default::default()
    }
}

async fn taxonomy(
    command: &Command,
    kind: TaxonomyKind,
    owner: &str,
    name: &str,
) -> anyhow::Result<i64> {
    let item = command
        .create_taxonomy(
            kind,
            owner,
            TaxonomyInput {
                name: name.to_owned(),
            },
        )
        .await?;

    Ok(item.id)
}

fn field_errors(err: Error) -> Vec<String> {
    let Error::Validate(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };

    errors
        .field_errors()
        .keys()
        .map(|key| key.to_string())
        .collect()
}

#[tokio::test]
async fn test_create_recipe_with_relations() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let owner = helpers::create_owner(&state, "owner@example.com").await?;
    let command = Command(state);

    let vegan = taxonomy(&command, TaxonomyKind::Tag, &owner, "Vegan").await?;
    let dessert = taxonomy(&command, TaxonomyKind::Tag, &owner, "Dessert").await?;
    let kale = taxonomy(&command, TaxonomyKind::Ingredient, &owner, "Kale").await?;

    let summary = command
        .create_recipe(
            &owner,
            RecipeInput {
                tags: vec![dessert, vegan, vegan],
                ingredients: vec![kale],
                link: Some("https://example.com/cake".to_owned()),
                ..sample("Cake")
            },
        )
        .await?;

    assert_eq!(summary.title, "Cake");
    assert_eq!(summary.time_minutes, 10);
    assert_eq!(summary.price.to_string(), "5.00");
    assert_eq!(summary.link, "https://example.com/cake");
    assert_eq!(
        summary.tags.iter().copied().collect::<BTreeSet<_>>(),
        BTreeSet::from([vegan, dessert])
    );
    assert_eq!(summary.ingredients, vec![kale]);

    let detail = command.recipe_detail(&owner, summary.id).await?;
    let names = detail
        .tags
        .iter()
        .map(|tag| tag.name.as_str())
        .collect::<BTreeSet<_>>();
    assert_eq!(names, BTreeSet::from(["Vegan", "Dessert"]));
    assert_eq!(detail.ingredients.len(), 1);
    assert_eq!(detail.ingredients[0].name, "Kale");

    Ok(())
}

#[tokio::test]
async fn test_create_recipe_validation() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let owner = helpers::create_owner(&state, "owner@example.com").await?;
    let command = Command(state);

    let err = command.create_recipe(&owner, sample("  ")).await.unwrap_err();
    assert_eq!(field_errors(err), vec!["title"]);

    let err = command
        .create_recipe(&owner, RecipeInput::default())
        .await
        .unwrap_err();
    let fields = field_errors(err).into_iter().collect::<BTreeSet<_>>();
    assert_eq!(
        fields,
        BTreeSet::from([
            "price".to_owned(),
            "time_minutes".to_owned(),
            "title".to_owned()
        ])
    );

    for price in ["5.555", "1000"] {
        let err = command
            .create_recipe(
                &owner,
                RecipeInput {
                    price: Some(Decimal::from_str(price)?),
                    ..sample("Soup")
                },
            )
            .await
            .unwrap_err();
        assert_eq!(field_errors(err), vec!["price"]);
    }

    assert!(
        command
            .list_recipes(&owner, RecipeFilter::default())
            .await?
            .is_empty()
    );

    Ok(())
}

#[tokio::test]
async fn test_create_recipe_rejects_foreign_relations() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let alice = helpers::create_owner(&state, "alice@example.com").await?;
    let bob = helpers::create_owner(&state, "bob@example.com").await?;
    let command = Command(state);

    let foreign = taxonomy(&command, TaxonomyKind::Tag, &bob, "Spicy").await?;

    let err = command
        .create_recipe(
            &alice,
            RecipeInput {
                tags: vec![foreign],
                ingredients: vec![404],
                ..sample("Curry")
            },
        )
        .await
        .unwrap_err();

    let Error::Validate(errors) = err else {
        panic!("expected validation error");
    };
    let fields = errors.field_errors();
    assert_eq!(
        fields["tags"][0].message.as_deref(),
        Some(format!("Invalid pk \"{foreign}\" - object does not exist.").as_str())
    );
    assert_eq!(
        fields["ingredients"][0].message.as_deref(),
        Some("Invalid pk \"404\" - object does not exist.")
    );

    assert!(
        command
            .list_recipes(&alice, RecipeFilter::default())
            .await?
            .is_empty()
    );

    Ok(())
}

#[tokio::test]
async fn test_list_is_scoped_and_sorted_by_id_desc() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let alice = helpers::create_owner(&state, "alice@example.com").await?;
    let bob = helpers::create_owner(&state, "bob@example.com").await?;
    let command = Command(state);

    let first = command.create_recipe(&alice, sample("First")).await?;
    command.create_recipe(&bob, sample("Other")).await?;
    let second = command.create_recipe(&alice, sample("Second")).await?;

    let recipes = command
        .list_recipes(&alice, RecipeFilter::default())
        .await?;
    assert_eq!(recipes, vec![second, first]);

    let recipes = command.list_recipes(&bob, RecipeFilter::default()).await?;
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].title, "Other");

    Ok(())
}

#[tokio::test]
async fn test_list_filters_by_tags_and_ingredients() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let owner = helpers::create_owner(&state, "owner@example.com").await?;
    let command = Command(state);

    let vegan = taxonomy(&command, TaxonomyKind::Tag, &owner, "Vegan").await?;
    let fish = taxonomy(&command, TaxonomyKind::Tag, &owner, "Fish").await?;
    let cheese = taxonomy(&command, TaxonomyKind::Ingredient, &owner, "Cheese").await?;

    let curry = command
        .create_recipe(
            &owner,
            RecipeInput {
                tags: vec![vegan],
                ..sample("Curry")
            },
        )
        .await?;
    let chips = command
        .create_recipe(
            &owner,
            RecipeInput {
                tags: vec![fish],
                ingredients: vec![cheese],
                ..sample("Fish and chips")
            },
        )
        .await?;
    command.create_recipe(&owner, sample("Plain")).await?;

    let recipes = command
        .list_recipes(
            &owner,
            RecipeFilter {
                tags: vec![vegan, fish],
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(recipes, vec![chips.clone(), curry]);

    let recipes = command
        .list_recipes(
            &owner,
            RecipeFilter {
                ingredients: vec![cheese],
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(recipes, vec![chips]);

    Ok(())
}

#[tokio::test]
async fn test_detail_of_foreign_recipe_is_not_found() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let alice = helpers::create_owner(&state, "alice@example.com").await?;
    let bob = helpers::create_owner(&state, "bob@example.com").await?;
    let command = Command(state);

    let recipe = command.create_recipe(&alice, sample("Secret")).await?;

    let err = command.recipe_detail(&bob, recipe.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound));

    let err = command.recipe_detail(&alice, 999).await.unwrap_err();
    assert!(matches!(err, Error::NotFound));

    Ok(())
}

#[tokio::test]
async fn test_update_recipe() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let owner = helpers::create_owner(&state, "owner@example.com").await?;
    let command = Command(state);

    let vegan = taxonomy(&command, TaxonomyKind::Tag, &owner, "Vegan").await?;
    let quick = taxonomy(&command, TaxonomyKind::Tag, &owner, "Quick").await?;

    let recipe = command
        .create_recipe(
            &owner,
            RecipeInput {
                tags: vec![vegan],
                link: Some("https://example.com".to_owned()),
                ..sample("Salad")
            },
        )
        .await?;

    let patched = command
        .update_recipe(
            &owner,
            recipe.id,
            RecipePatch {
                title: Some("Green salad".to_owned()),
                tags: Some(vec![quick]),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(patched.title, "Green salad");
    assert_eq!(patched.tags, vec![quick]);
    assert_eq!(patched.time_minutes, 10);
    assert_eq!(patched.link, "https://example.com");

    let replaced = command
        .update_recipe(
            &owner,
            recipe.id,
            RecipeInput {
                time_minutes: Some(25),
                price: Some(Decimal::from_str("7.5")?),
                ..sample("Soup")
            }
            .into(),
        )
        .await?;
    assert_eq!(replaced.title, "Soup");
    assert_eq!(replaced.time_minutes, 25);
    assert_eq!(replaced.price.to_string(), "7.50");
    assert_eq!(replaced.link, "");
    assert!(replaced.tags.is_empty());

    let err = command
        .update_recipe(
            &owner,
            recipe.id,
            RecipePatch {
                title: Some(" ".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(field_errors(err), vec!["title"]);

    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_foreign_recipe_is_not_found() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let alice = helpers::create_owner(&state, "alice@example.com").await?;
    let bob = helpers::create_owner(&state, "bob@example.com").await?;
    let command = Command(state);

    let recipe = command.create_recipe(&alice, sample("Secret")).await?;

    let err = command
        .update_recipe(&bob, recipe.id, RecipePatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound));

    let err = command.delete_recipe(&bob, recipe.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound));

    command.delete_recipe(&alice, recipe.id).await?;
    assert!(
        command
            .list_recipes(&alice, RecipeFilter::default())
            .await?
            .is_empty()
    );

    Ok(())
}

#[test]
fn test_parse_ids() {
    assert_eq!(parse_ids("tags", "1,2, 3").unwrap(), vec![1, 2, 3]);
    assert_eq!(parse_ids("tags", "").unwrap(), Vec::<i64>::new());

    let errors = parse_ids("tags", "1,abc").unwrap_err();
    assert!(errors.field_errors().contains_key("tags"));
}
