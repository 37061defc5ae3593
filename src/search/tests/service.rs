mod search_tests {
    use crate::model::file_types::FileTypes;
    use crate::repository::Database;
    use crate::search::models::{FileResult, FolderResult, SearchRequest, SearchResult};
    use crate::search::service::{search, search_database};
    use crate::test::*;

    fn run(query: Option<&str>, tags: &[&str], file_type: Option<&str>) -> Vec<SearchResult> {
        let request = SearchRequest::new(
            query.map(str::to_string),
            tags.iter().map(|t| t.to_string()).collect(),
            file_type.map(str::to_string),
        );
        let con = test_database().open_connection().unwrap();
        let results = search(&request, &con).unwrap();
        con.close().unwrap();
        results
    }

    fn paths(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.path()).collect()
    }

    #[test]
    fn tag_on_model_returns_only_the_model() {
        init_db_folder();
        create_dragon_tree();
        let results = run(None, &["32mm"], None);
        assert_eq!(
            vec![SearchResult::Folder(FolderResult {
                name: "Dragon".to_string(),
                path: "Pub/Coll/Dragon".to_string(),
                item_count: 2,
                preview_path: None,
                match_reason: "Has tags: 32mm".to_string(),
            })],
            results
        );
        cleanup();
    }

    #[test]
    fn file_type_matches_collapse_to_their_model() {
        init_db_folder();
        create_item_db_entry("Pub", FileTypes::Publisher);
        create_item_db_entry("Pub/Coll", FileTypes::Collection);
        create_item_db_entry("Pub/Coll/Dragon", FileTypes::Model);
        create_item_db_entry("Pub/Coll/Dragon/body.stl", FileTypes::Stl);
        create_item_db_entry("Pub/Coll/Dragon/head.stl", FileTypes::Stl);
        let results = run(None, &[], Some("STL File"));
        assert_eq!(vec!["Pub/Coll/Dragon"], paths(&results));
        // the model itself isn't an stl file, so it has no reason of its own
        assert_eq!("", results[0].match_reason());
        cleanup();
    }

    #[test]
    fn every_matching_criterion_is_listed_in_order() {
        init_db_folder();
        create_dragon_tree();
        let results = run(Some("dragon"), &["32mm"], Some("Model"));
        assert_eq!(vec!["Pub/Coll/Dragon"], paths(&results));
        assert_eq!(
            "Matches \"dragon\", Has tags: 32mm, Type: Model",
            results[0].match_reason()
        );
        cleanup();
    }

    #[test]
    fn untagged_sibling_model_is_excluded() {
        init_db_folder();
        create_dragon_tree();
        let results = run(None, &["32mm"], None);
        assert!(!paths(&results).contains(&"Pub/Coll/Goblin"));
        cleanup();
    }

    #[test]
    fn tags_are_inherited_at_any_depth() {
        init_db_folder();
        create_dragon_tree();
        let publisher = crate::repository::item_repository::get_item_by_path(
            "Pub",
            &test_database().open_connection().unwrap(),
        )
        .unwrap()
        .unwrap();
        create_tag_item("resin", publisher.id.unwrap());
        let results = run(None, &["resin"], Some("STL File"));
        assert_eq!(vec!["Pub/Coll/Dragon", "Pub/Coll/Goblin"], paths(&results));
        cleanup();
    }

    #[test]
    fn all_tags_must_match() {
        init_db_folder();
        let dragon = create_dragon_tree();
        let collection = create_item_db_entry("Pub/Coll2", FileTypes::Collection);
        create_item_db_entry("Pub/Coll2/Wyrm", FileTypes::Model);
        create_tag_item("painted", collection);
        create_tag_item("painted", dragon);
        create_tag_item("32mm", collection);
        let both = run(None, &["painted", "32mm"], None);
        assert_eq!(
            vec!["Pub/Coll/Dragon", "Pub/Coll2", "Pub/Coll2/Wyrm"],
            paths(&both)
        );
        let none = run(None, &["painted", "does not exist"], None);
        assert!(none.is_empty());
        cleanup();
    }

    #[test]
    fn criteria_are_combined_with_and() {
        init_db_folder();
        create_dragon_tree();
        assert!(run(Some("goblin"), &["32mm"], None).is_empty());
        assert!(run(Some("dragon"), &[], Some("Collection")).is_empty());
        cleanup();
    }

    #[test]
    fn no_criteria_never_touches_the_database() {
        // opening a connection here would fail, so an Ok result proves nothing was read
        let database = Database::new("./this/folder/does/not/exist/db.sqlite");
        let request = SearchRequest::new(Some("  ".to_string()), vec!["".to_string()], None);
        assert_eq!(Ok(vec![]), search_database(&request, &database));
    }

    #[test]
    fn text_search_ignores_case_and_checks_description_and_notes() {
        init_db_folder();
        create_dragon_tree();
        describe_item("Pub/Coll/Goblin", None, Some("Needs heavy SUPPORTS"));
        describe_item("Pub/Coll/Dragon/head.stl", Some("the scary end"), None);
        assert_eq!(vec!["Pub/Coll/Dragon"], paths(&run(Some("DRAGON"), &[], None)));
        assert_eq!(vec!["Pub/Coll/Goblin"], paths(&run(Some("supports"), &[], None)));
        let scary = run(Some("Scary"), &[], None);
        assert_eq!(vec!["Pub/Coll/Dragon"], paths(&scary));
        // head.stl matched, not the dragon folder that represents it
        assert_eq!("", scary[0].match_reason());
        cleanup();
    }

    #[test]
    fn text_search_is_literal() {
        init_db_folder();
        create_item_db_entry("Pub", FileTypes::Publisher);
        create_item_db_entry("Pub/a_b", FileTypes::Collection);
        create_item_db_entry("Pub/axb", FileTypes::Collection);
        create_item_db_entry("Pub/100%", FileTypes::Collection);
        assert_eq!(vec!["Pub/a_b"], paths(&run(Some("a_b"), &[], None)));
        assert_eq!(vec!["Pub/100%"], paths(&run(Some("%"), &[], None)));
        // surrounding whitespace is part of the query
        assert!(run(Some(" axb"), &[], None).is_empty());
        cleanup();
    }

    #[test]
    fn results_keep_first_match_order_without_duplicates() {
        init_db_folder();
        create_dragon_tree();
        let results = run(Some("o"), &[], None);
        assert_eq!(
            vec!["Pub/Coll", "Pub/Coll/Dragon", "Pub/Coll/Goblin"],
            paths(&results)
        );
        cleanup();
    }

    #[test]
    fn unrecognized_file_type_matches_nothing() {
        init_db_folder();
        create_dragon_tree();
        assert!(run(None, &[], Some("Spaceship")).is_empty());
        assert!(run(Some("dragon"), &[], Some("stl file")).is_empty());
        cleanup();
    }

    #[test]
    fn files_outside_of_models_are_returned_as_files() {
        init_db_folder();
        create_dragon_tree();
        create_item_db_entry("Pub/Loose.STL", FileTypes::Stl);
        let results = run(Some("loose"), &[], None);
        let SearchResult::File(FileResult {
            name,
            path,
            extension,
            size,
            match_reason,
            ..
        }) = &results[0]
        else {
            panic!("expected a file result, got {results:?}");
        };
        assert_eq!("Loose.STL", name);
        assert_eq!("Pub/Loose.STL", path);
        assert_eq!("stl", extension);
        assert_eq!(0, *size);
        assert_eq!("Matches \"loose\"", match_reason);
        cleanup();
    }

    #[test]
    fn folders_preview_their_shallowest_image() {
        init_db_folder();
        create_dragon_tree();
        create_item_db_entry("Pub/Coll/Dragon/Supported", FileTypes::Variant);
        create_item_db_entry("Pub/Coll/Dragon/Supported/a.png", FileTypes::Image);
        create_item_db_entry("Pub/Coll/Dragon/render.jpg", FileTypes::Image);
        create_item_db_entry("Pub/Coll/Dragon/cover.png", FileTypes::Image);
        let results = run(None, &["32mm"], None);
        let SearchResult::Folder(folder) = &results[0] else {
            panic!("expected a folder result, got {results:?}");
        };
        assert_eq!(Some("Pub/Coll/Dragon/cover.png".to_string()), folder.preview_path);
        assert_eq!(5, folder.item_count);
        cleanup();
    }
}

mod resolve_model_folders_tests {
    use crate::model::file_types::FileTypes;
    use crate::search::models::MatchSet;
    use crate::search::service::resolve_model_folders;
    use crate::test::*;

    fn set(paths: &[&str]) -> MatchSet {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn resolves_to_nearest_model_and_dedupes() {
        init_db_folder();
        create_dragon_tree();
        create_item_db_entry("Pub/Coll/Dragon/Supported", FileTypes::Variant);
        create_item_db_entry("Pub/Coll/Dragon/Supported/body.stl", FileTypes::Stl);
        let con = test_database().open_connection().unwrap();
        let resolved = resolve_model_folders(
            &set(&[
                "Pub/Coll/Dragon/Supported/body.stl",
                "Pub/Coll/Goblin/goblin.stl",
                "Pub/Coll/Dragon/head.stl",
                "Pub",
                "Not/In/The/Database",
            ]),
            &con,
        )
        .unwrap();
        assert_eq!(
            vec![
                "Pub/Coll/Dragon",
                "Pub/Coll/Goblin",
                "Pub",
                "Not/In/The/Database"
            ],
            resolved.clone().into_paths()
        );
        let resolved_again = resolve_model_folders(&resolved, &con).unwrap();
        assert_eq!(resolved.into_paths(), resolved_again.into_paths());
        con.close().unwrap();
        cleanup();
    }
}

mod combine_criteria_tests {
    use crate::search::models::{Criterion, CriterionKind, MatchSet};
    use crate::search::service::combine_criteria;

    fn criterion(paths: &[&str]) -> Criterion {
        Criterion {
            kind: CriterionKind::Text("x".to_string()),
            matches: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn single_criterion_is_unchanged() {
        let combined = combine_criteria(&[criterion(&["b", "a"])]);
        assert_eq!(vec!["b", "a"], combined.into_paths());
    }

    #[test]
    fn multiple_criteria_intersect() {
        let combined = combine_criteria(&[
            criterion(&["c", "b", "a"]),
            criterion(&["a", "c"]),
            criterion(&["c", "a", "z"]),
        ]);
        assert_eq!(vec!["c", "a"], combined.into_paths());
    }

    #[test]
    fn no_criteria_is_empty() {
        assert_eq!(MatchSet::new(), combine_criteria(&[]));
    }
}
