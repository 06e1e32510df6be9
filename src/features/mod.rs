/// 商品图片缓存
pub mod catalog_image;
/// 健康检查
pub mod health {
    pub mod handler;
}
/// 后台组件实例
pub mod widget;
