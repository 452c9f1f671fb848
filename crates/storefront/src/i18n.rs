//! Translation tables for the public site.
//!
//! Every supported [`Language`] has a complete, statically allocated
//! [`Translation`]. Templates receive a `&'static Translation` and never
//! format user-facing text themselves.

use bakalah_core::Language;

/// Company contact details shown on every page. Not translated.
pub mod contact {
    pub const EMAIL: &str = "bakalahgaharu@gmail.com";
    pub const PHONE: &str = "+62 85124776840";
    pub const PHONE_HREF: &str = "tel:+6285124776840";
    pub const ADDRESS_LINES: [&str; 3] = ["JL. IR JUANDA NO 31", "Probolinggo, East Java", "Indonesia"];
}

#[derive(Debug)]
pub struct Nav {
    pub home: &'static str,
    pub about: &'static str,
    pub products: &'static str,
    pub contact: &'static str,
}

#[derive(Debug)]
pub struct Hero {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub cta: &'static str,
}

#[derive(Debug)]
pub struct CustomOrder {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub button: &'static str,
}

#[derive(Debug)]
pub struct About {
    pub title: &'static str,
    pub established: &'static str,
    pub location: &'static str,
    pub description: &'static str,
    pub features: [&'static str; 5],
    pub custom_order: CustomOrder,
}

#[derive(Debug)]
pub struct ProductDetailsText {
    pub description: &'static str,
    pub details: &'static str,
    pub product_id: &'static str,
    pub availability: &'static str,
    pub in_stock: &'static str,
    pub shipping: &'static str,
    pub worldwide: &'static str,
    pub lead_time: &'static str,
    pub business_days: &'static str,
}

#[derive(Debug)]
pub struct ProductsText {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub grade: &'static str,
    pub colors: &'static str,
    pub price: &'static str,
    pub view_details: &'static str,
    pub inquiry_note: &'static str,
    /// Shown while the remote catalog is unavailable.
    pub fallback_notice: &'static str,
    pub not_found: &'static str,
    pub back_to_products: &'static str,
    pub details: ProductDetailsText,
    pub custom_order_title: &'static str,
    pub custom_order_button: &'static str,
}

#[derive(Debug)]
pub struct ContactText {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub address: &'static str,
    pub working_hours: &'static str,
    pub info: &'static str,
}

#[derive(Debug)]
pub struct Footer {
    pub company: &'static str,
    pub tagline: &'static str,
    pub description: &'static str,
    pub quick_links: &'static str,
    pub contact_info: &'static str,
    pub language: &'static str,
    pub rights: &'static str,
}

/// All user-facing text for one language.
#[derive(Debug)]
pub struct Translation {
    pub page_title: &'static str,
    pub nav: Nav,
    pub hero: Hero,
    pub about: About,
    pub products: ProductsText,
    pub contact: ContactText,
    pub footer: Footer,
}

/// Get the translation table for a language.
#[must_use]
pub const fn translations(lang: Language) -> &'static Translation {
    match lang {
        Language::En => &EN,
        Language::Id => &ID,
        Language::Ar => &AR,
    }
}

static EN: Translation = Translation {
    page_title: "PT Bakalah Gaharu Nusantara - Premium Agarwood Exporter Indonesia",
    nav: Nav {
        home: "Home",
        about: "About",
        products: "Products",
        contact: "Contact",
    },
    hero: Hero {
        title: "Premium Agarwood Exporter from Indonesia",
        subtitle: "Welcome to PT Bakalah Gaharu Nusantara, your trusted partner for high-quality agarwood products, sustainably sourced from East Java",
        cta: "Explore Products",
    },
    about: About {
        title: "About Our Company",
        established: "Established in 2015",
        location: "Located in Probolinggo, East Java",
        description: "PT Bakalah Gaharu Nusantara is a leading exporter of premium agarwood products from Indonesia. We are committed to sustainable harvesting practices while delivering the finest quality agarwood to international markets.",
        features: [
            "Premium Quality Assurance",
            "Sustainable Harvesting",
            "International Export Standards",
            "Community Partnership",
            "Environmental Responsibility",
        ],
        custom_order: CustomOrder {
            title: "Looking for custom orders or bulk quantities?",
            subtitle: "Quick Contact via WhatsApp",
            button: "Contact Us Now",
        },
    },
    products: ProductsText {
        title: "Our Premium Products",
        subtitle: "Discover our carefully selected agarwood collection, highly demanded in Middle Eastern markets",
        grade: "Grade",
        colors: "Colors",
        price: "Price",
        view_details: "View Details",
        inquiry_note: "Click to inquire about pricing and availability",
        fallback_notice: "Showing our core collection. Additional products are temporarily unavailable.",
        not_found: "Product not found",
        back_to_products: "Back to products",
        details: ProductDetailsText {
            description: "Product Description",
            details: "Product Details",
            product_id: "Product ID",
            availability: "Availability",
            in_stock: "In Stock",
            shipping: "Shipping",
            worldwide: "Worldwide",
            lead_time: "Lead Time",
            business_days: "business days",
        },
        custom_order_title: "Looking for custom orders or bulk quantities?",
        custom_order_button: "Contact Us",
    },
    contact: ContactText {
        title: "Contact Us",
        subtitle: "Ready to place an order or have questions? Get in touch with our team",
        email: "Email",
        phone: "Phone",
        address: "Address",
        working_hours: "Monday - Friday: 9:00 - 17:00 WIB",
        info: "Contact Information",
    },
    footer: Footer {
        company: "PT Bakalah Gaharu Nusantara",
        tagline: "Premium Agarwood Exporter",
        description: "Your trusted partner for high-quality agarwood products, sustainably sourced from East Java, Indonesia.",
        quick_links: "Quick Links",
        contact_info: "Contact Info",
        language: "Language",
        rights: "All rights reserved.",
    },
};

static ID: Translation = Translation {
    page_title: "PT Bakalah Gaharu Nusantara - Eksportir Gaharu Premium Indonesia",
    nav: Nav {
        home: "Beranda",
        about: "Tentang",
        products: "Produk",
        contact: "Kontak",
    },
    hero: Hero {
        title: "Eksportir Gaharu Premium dari Indonesia",
        subtitle: "Selamat datang di PT Bakalah Gaharu Nusantara, mitra terpercaya untuk produk gaharu berkualitas tinggi, dipanen secara berkelanjutan dari Jawa Timur",
        cta: "Jelajahi Produk",
    },
    about: About {
        title: "Tentang Perusahaan Kami",
        established: "Didirikan pada tahun 2015",
        location: "Berlokasi di Probolinggo, Jawa Timur",
        description: "PT Bakalah Gaharu Nusantara adalah eksportir terkemuka produk gaharu premium dari Indonesia. Kami berkomitmen pada praktik pemanenan berkelanjutan sambil menghadirkan gaharu berkualitas terbaik ke pasar internasional.",
        features: [
            "Jaminan Kualitas Premium",
            "Pemanenan Berkelanjutan",
            "Standar Ekspor Internasional",
            "Kemitraan Komunitas",
            "Tanggung Jawab Lingkungan",
        ],
        custom_order: CustomOrder {
            title: "Mencari pesanan khusus atau jumlah besar?",
            subtitle: "Hubungi Cepat melalui WhatsApp",
            button: "Hubungi Kami Sekarang",
        },
    },
    products: ProductsText {
        title: "Produk Unggulan Kami",
        subtitle: "Temukan koleksi gaharu pilihan kami yang sangat diminati di pasar Timur Tengah",
        grade: "Kelas",
        colors: "Warna",
        price: "Harga",
        view_details: "Lihat Detail",
        inquiry_note: "Klik untuk menanyakan harga dan ketersediaan",
        fallback_notice: "Menampilkan koleksi utama kami. Produk tambahan sementara tidak tersedia.",
        not_found: "Produk tidak ditemukan",
        back_to_products: "Kembali ke produk",
        details: ProductDetailsText {
            description: "Deskripsi Produk",
            details: "Detail Produk",
            product_id: "ID Produk",
            availability: "Ketersediaan",
            in_stock: "Tersedia",
            shipping: "Pengiriman",
            worldwide: "Seluruh Dunia",
            lead_time: "Waktu Pengerjaan",
            business_days: "hari kerja",
        },
        custom_order_title: "Mencari pesanan khusus atau jumlah besar?",
        custom_order_button: "Hubungi Kami",
    },
    contact: ContactText {
        title: "Hubungi Kami",
        subtitle: "Siap memesan atau ada pertanyaan? Hubungi tim kami",
        email: "Email",
        phone: "Telepon",
        address: "Alamat",
        working_hours: "Senin - Jumat: 09:00 - 17:00 WIB",
        info: "Informasi Kontak",
    },
    footer: Footer {
        company: "PT Bakalah Gaharu Nusantara",
        tagline: "Eksportir Gaharu Premium",
        description: "Mitra terpercaya untuk produk gaharu berkualitas tinggi, dipanen secara berkelanjutan dari Jawa Timur, Indonesia.",
        quick_links: "Tautan Cepat",
        contact_info: "Info Kontak",
        language: "Bahasa",
        rights: "Hak Cipta Dilindungi.",
    },
};

static AR: Translation = Translation {
    page_title: "PT Bakalah Gaharu Nusantara - مصدر العود الفاخر من إندونيسيا",
    nav: Nav {
        home: "الرئيسية",
        about: "حولنا",
        products: "المنتجات",
        contact: "اتصل بنا",
    },
    hero: Hero {
        title: "مصدر العود الفاخر من إندونيسيا",
        subtitle: "مرحباً بكم في شركة PT Bakalah Gaharu Nusantara، شريككم الموثوق لمنتجات العود عالية الجودة، المحصودة بشكل مستدام من جاوة الشرقية",
        cta: "استكشف المنتجات",
    },
    about: About {
        title: "حول شركتنا",
        established: "تأسست في عام 2015",
        location: "تقع في بروبولينجو، جاوة الشرقية",
        description: "شركة PT Bakalah Gaharu Nusantara هي مصدر رائد لمنتجات العود الفاخرة من إندونيسيا. نحن ملتزمون بممارسات الحصاد المستدامة مع تقديم أجود أنواع العود للأسواق الدولية.",
        features: [
            "ضمان الجودة الممتازة",
            "حصاد مستدام",
            "معايير التصدير الدولية",
            "شراكة مجتمعية",
            "المسؤولية البيئية",
        ],
        custom_order: CustomOrder {
            title: "هل تبحث عن طلبات مخصصة أو كميات كبيرة؟",
            subtitle: "اتصل بنا سريعًا عبر واتساب",
            button: "اتصل بنا الآن",
        },
    },
    products: ProductsText {
        title: "منتجاتنا المميزة",
        subtitle: "اكتشف مجموعتنا المختارة بعناية من خشب العود، المطلوبة بشدة في أسواق الشرق الأوسط",
        grade: "الجودة",
        colors: "الألوان",
        price: "السعر",
        view_details: "عرض التفاصيل",
        inquiry_note: "انقر للاستفسار عن الأسعار والتوفر",
        fallback_notice: "نعرض مجموعتنا الأساسية. المنتجات الإضافية غير متاحة مؤقتًا.",
        not_found: "المنتج غير موجود",
        back_to_products: "العودة إلى المنتجات",
        details: ProductDetailsText {
            description: "وصف المنتج",
            details: "تفاصيل المنتج",
            product_id: "معرّف المنتج",
            availability: "التوفر",
            in_stock: "متوفر",
            shipping: "الشحن",
            worldwide: "شحن عالمي",
            lead_time: "مدة التجهيز",
            business_days: "يوم عمل",
        },
        custom_order_title: "هل تبحث عن طلبات مخصصة أو كميات كبيرة؟",
        custom_order_button: "اتصل بنا",
    },
    contact: ContactText {
        title: "اتصل بنا",
        subtitle: "هل أنت مستعد للطلب أو لديك استفسارات؟ تواصل مع فريقنا",
        email: "البريد الإلكتروني",
        phone: "الهاتف",
        address: "العنوان",
        working_hours: "الاثنين - الجمعة: 9:00 - 17:00 بتوقيت غرب إندونيسيا",
        info: "معلومات الاتصال",
    },
    footer: Footer {
        company: "شركة بقالة عود النوسانتارا",
        tagline: "مصدر خشب العود الفاخر",
        description: "شريكك الموثوق لمنتجات خشب العود عالية الجودة، مصدرها مستدام من شرق جاوة، إندونيسيا.",
        quick_links: "روابط سريعة",
        contact_info: "معلومات الاتصال",
        language: "اللغة",
        rights: "جميع الحقوق محفوظة.",
    },
};
