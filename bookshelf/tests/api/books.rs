use reqwest::multipart::{Form, Part};

use crate::helpers::{assert_is_redirect_to, location, spawn_app, PUBLIC_URL_BASE};

fn book_form(title: &str) -> Form {
    Form::new()
        .text("title", title.to_string())
        .text("author", "Frank Herbert")
        .text("publishedDate", "1965")
        .text("description", "A desert planet")
}

fn image_part(file_name: &str, mime: &str) -> Part {
    Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap()
}

#[tokio::test]
async fn books_are_listed_by_title() {
    let app = spawn_app().await;
    app.insert_book("Neuromancer", None);
    app.insert_book("Dune", None);
    app.insert_book("Hyperion", None);

    let html = app.get_html("/").await;

    let dune = html.find("Dune").unwrap();
    let hyperion = html.find("Hyperion").unwrap();
    let neuromancer = html.find("Neuromancer").unwrap();
    assert!(dune < hyperion);
    assert!(hyperion < neuromancer);
}

#[tokio::test]
async fn uppercase_titles_are_listed_first() {
    let app = spawn_app().await;
    app.insert_book("apple", None);
    app.insert_book("Zebra", None);

    let html = app.get_html("/").await;

    assert!(html.find("Zebra").unwrap() < html.find("apple").unwrap());
}

#[tokio::test]
async fn an_empty_shelf_is_listed_as_such() {
    let app = spawn_app().await;

    let response = app.get("/").await;

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().contains("No books found"));
}

#[tokio::test]
async fn viewing_an_unknown_book_returns_a_404() {
    let app = spawn_app().await;

    let response = app.get("/books/unknown-id").await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn anonymous_users_see_books_without_translation() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", Some("A desert planet"));

    let response = app.get(&format!("/books/{}", book.id)).await;

    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("A desert planet"));
    assert!(!html.contains("book-translation"));
    assert_eq!(app.translation_service.nb_translations(), 0);
}

#[tokio::test]
async fn logged_in_users_see_the_description_translated_to_their_language() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", Some("A desert planet"));
    app.log_in().await;

    let html = app.get_html(&format!("/books/{}", book.id)).await;

    assert!(html.contains("Description (English)"));
    assert!(html.contains("Translation (English)"));
    assert!(html.contains("[en] A desert planet"));
    assert_eq!(app.translation_service.nb_translations(), 1);
}

#[tokio::test]
async fn books_without_description_are_not_translated() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", None);
    app.log_in().await;

    let html = app.get_html(&format!("/books/{}", book.id)).await;

    assert!(html.contains("No description found"));
    assert_eq!(app.translation_service.nb_translations(), 0);
}

#[tokio::test]
async fn book_forms_require_a_logged_in_user() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", None);

    for path in [
        "/books/add".to_string(),
        format!("/books/{}/edit", book.id),
        format!("/books/{}/delete", book.id),
    ] {
        let response = app.get(&path).await;

        assert_is_redirect_to(&response, "/login");
    }
    assert_eq!(app.books.all().len(), 1);
}

#[tokio::test]
async fn adding_a_book_anonymously_stores_nothing() {
    let app = spawn_app().await;

    let response = app.post_multipart("/books/add", book_form("Dune")).await;

    assert_is_redirect_to(&response, "/login");
    assert!(app.books.all().is_empty());
}

#[tokio::test]
async fn logging_in_goes_back_to_the_add_form() {
    let app = spawn_app().await;
    app.get("/books/add").await;

    let response = app.log_in().await;

    assert_is_redirect_to(&response, "/books/add");
    let html = app.get_html("/books/add").await;
    assert!(html.contains("Add book"));
}

#[tokio::test]
async fn logging_in_to_delete_a_book_goes_back_to_the_book_page() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", None);
    app.get(&format!("/books/{}/delete", book.id)).await;

    let response = app.log_in().await;

    assert_is_redirect_to(&response, &format!("/books/{}", book.id));
    assert_eq!(app.books.all().len(), 1);
}

#[tokio::test]
async fn adding_a_book_stores_it_and_redirects_to_its_page() {
    let app = spawn_app().await;
    app.log_in().await;

    let response = app.post_multipart("/books/add", book_form("Dune")).await;

    let books = app.books.all();
    assert_eq!(books.len(), 1);
    let book = &books[0];
    assert_is_redirect_to(&response, &format!("/books/{}", book.id));
    assert_eq!(book.title, "Dune");
    assert_eq!(book.author.as_deref(), Some("Frank Herbert"));
    assert_eq!(book.published_date.as_deref(), Some("1965"));
    assert_eq!(book.description.as_deref(), Some("A desert planet"));
    assert_eq!(book.image_url, None);
}

#[tokio::test]
async fn adding_a_book_without_title_returns_a_400() {
    let app = spawn_app().await;
    app.log_in().await;

    let form = Form::new().text("title", "  ").text("author", "Nobody");
    let response = app.post_multipart("/books/add", form).await;

    assert_eq!(response.status().as_u16(), 400);
    assert!(app.books.all().is_empty());
}

#[tokio::test]
async fn an_uploaded_cover_is_stored_with_a_timestamped_name() {
    let app = spawn_app().await;
    app.log_in().await;
    let object_name =
        regex::Regex::new(r"^my_cover-\d{4}-\d{2}-\d{2}-\d{6}\.(png|jpg|JPEG|gif)$").unwrap();

    for (file_name, mime) in [
        ("my cover.png", "image/png"),
        ("my cover.jpg", "image/jpeg"),
        ("my cover.JPEG", "image/jpeg"),
        ("my cover.gif", "image/gif"),
    ] {
        let form = book_form("Dune").part("image", image_part(file_name, mime));
        let response = app.post_multipart("/books/add", form).await;
        assert_eq!(response.status().as_u16(), 302, "{}", file_name);
    }

    let object_names = app.images.object_names();
    assert_eq!(object_names.len(), 4);
    for name in &object_names {
        assert!(object_name.is_match(name), "{}", name);
    }

    for book in app.books.all() {
        let image_url = book.image_url.unwrap();
        assert!(image_url.starts_with(PUBLIC_URL_BASE));
        assert!(object_names.contains(&image_url[PUBLIC_URL_BASE.len() + 1..].to_string()));
    }
}

#[tokio::test]
async fn the_content_type_of_the_cover_is_kept() {
    let app = spawn_app().await;
    app.log_in().await;

    let form = book_form("Dune").part("image", image_part("cover.gif", "image/gif"));
    app.post_multipart("/books/add", form).await;

    let object_names = app.images.object_names();
    assert_eq!(
        app.images.content_type(&object_names[0]).as_deref(),
        Some("image/gif")
    );
}

#[tokio::test]
async fn a_cover_with_a_forbidden_extension_is_rejected() {
    let app = spawn_app().await;
    app.log_in().await;

    let form = book_form("Dune").part(
        "image",
        image_part("virus.exe", "application/octet-stream"),
    );
    let response = app.post_multipart("/books/add", form).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        response.text().await.unwrap(),
        "virus.exe has an invalid name or extension"
    );
    assert!(app.images.object_names().is_empty());
    assert!(app.books.all().is_empty());
}

#[tokio::test]
async fn an_empty_file_input_is_not_an_upload() {
    let app = spawn_app().await;
    app.log_in().await;

    let empty_file = Part::bytes(Vec::new())
        .file_name("")
        .mime_str("application/octet-stream")
        .unwrap();
    let form = book_form("Dune").part("image", empty_file);
    let response = app.post_multipart("/books/add", form).await;

    assert_eq!(response.status().as_u16(), 302);
    assert!(app.images.object_names().is_empty());
    assert_eq!(app.books.all()[0].image_url, None);
}

#[tokio::test]
async fn editing_a_book_overwrites_it_and_keeps_its_cover() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", Some("A desert planet"));
    app.log_in().await;
    let cover_url = "https://storage.test/covers/dune.png";

    let form = Form::new()
        .text("title", "Dune Messiah")
        .text("author", "Frank Herbert")
        .text("imageUrl", cover_url);
    let response = app
        .post_multipart(&format!("/books/{}/edit", book.id), form)
        .await;

    assert_is_redirect_to(&response, &format!("/books/{}", book.id));
    let books = app.books.all();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, book.id);
    assert_eq!(books[0].title, "Dune Messiah");
    assert_eq!(books[0].description, None);
    assert_eq!(books[0].image_url.as_deref(), Some(cover_url));
}

#[tokio::test]
async fn a_new_cover_replaces_the_current_one() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", None);
    app.log_in().await;

    let form = book_form("Dune")
        .text("imageUrl", "https://storage.test/covers/old.png")
        .part("image", image_part("new.png", "image/png"));
    app.post_multipart(&format!("/books/{}/edit", book.id), form)
        .await;

    let image_url = app.books.all()[0].image_url.clone().unwrap();
    assert!(image_url.starts_with(&format!("{}/new-", PUBLIC_URL_BASE)));
}

#[tokio::test]
async fn the_edit_form_is_filled_with_the_book() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", Some("A desert planet"));
    app.log_in().await;

    let response = app.get(&format!("/books/{}/edit", book.id)).await;

    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains("Edit book"));
    assert!(html.contains("value=\"Dune\""));
    assert!(html.contains("A desert planet"));
}

#[tokio::test]
async fn editing_an_unknown_book_returns_a_404() {
    let app = spawn_app().await;
    app.log_in().await;

    let response = app.get("/books/unknown-id/edit").await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .post_multipart("/books/unknown-id/edit", book_form("Dune"))
        .await;
    assert_eq!(response.status().as_u16(), 404);
    assert!(app.books.all().is_empty());
}

#[tokio::test]
async fn deleting_a_book_redirects_to_the_list() {
    let app = spawn_app().await;
    let book = app.insert_book("Dune", None);
    app.insert_book("Hyperion", None);
    app.log_in().await;

    let response = app.get(&format!("/books/{}/delete", book.id)).await;

    assert_eq!(location(&response), "/");
    let books = app.books.all();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Hyperion");
}
